use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::Result;

/// The kind of work an `IOContext` describes.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum IOContextType {
    Merge,
    Read,
    Flush,
    Default,
}

impl fmt::Display for IOContextType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            IOContextType::Merge => "MERGE",
            IOContextType::Read => "READ",
            IOContextType::Flush => "FLUSH",
            IOContextType::Default => "DEFAULT",
        };
        f.write_str(name)
    }
}

/// IOContext holds additional details on the merge/search context and
/// specifies the context in which the Directory is being used for.
///
/// Merge and flush details travel inside their variant, so a MERGE context
/// always has a `MergeInfo`, a FLUSH context always has a `FlushInfo`, and
/// no other context carries either.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum IOContext {
    Merge(MergeInfo),
    Read(bool),
    Flush(FlushInfo),
    Default,
}

impl IOContext {
    pub const DEFAULT: IOContext = IOContext::Default;
    pub const READ: IOContext = IOContext::Read(false);
    pub const READ_ONCE: IOContext = IOContext::Read(true);

    pub fn for_flush(flush_info: Option<FlushInfo>) -> Result<IOContext> {
        match flush_info {
            Some(info) => Ok(IOContext::Flush(info)),
            None => Err(Error::IllegalArgument(
                "FlushInfo must not be empty if context is FLUSH".into(),
            )),
        }
    }

    pub fn for_merge(merge_info: Option<MergeInfo>) -> Result<IOContext> {
        match merge_info {
            Some(info) => Ok(IOContext::Merge(info)),
            None => Err(Error::IllegalArgument(
                "MergeInfo must not be empty if context is MERGE".into(),
            )),
        }
    }

    /// Builds a context that carries no merge or flush details.
    pub fn from_type(context: IOContextType) -> Result<IOContext> {
        match context {
            IOContextType::Merge => Err(Error::IllegalArgument(
                "Use IOContext::for_merge to create a MERGE IOContext".into(),
            )),
            IOContextType::Flush => Err(Error::IllegalArgument(
                "Use IOContext::for_flush to create a FLUSH IOContext".into(),
            )),
            IOContextType::Read => Ok(IOContext::READ),
            IOContextType::Default => Ok(IOContext::Default),
        }
    }

    pub fn from_read_once(read_once: bool) -> IOContext {
        IOContext::Read(read_once)
    }

    pub fn context_type(&self) -> IOContextType {
        match self {
            IOContext::Merge(_) => IOContextType::Merge,
            IOContext::Read(_) => IOContextType::Read,
            IOContext::Flush(_) => IOContextType::Flush,
            IOContext::Default => IOContextType::Default,
        }
    }

    pub fn merge_info(&self) -> Option<&MergeInfo> {
        match self {
            IOContext::Merge(info) => Some(info),
            _ => None,
        }
    }

    pub fn flush_info(&self) -> Option<&FlushInfo> {
        match self {
            IOContext::Flush(info) => Some(info),
            _ => None,
        }
    }

    /// Whether the file is read once, sequentially, and then discarded.
    pub fn read_once(&self) -> bool {
        match self {
            IOContext::Read(read_once) => *read_once,
            _ => false,
        }
    }

    pub fn is_merge(&self) -> bool {
        match self {
            IOContext::Merge(_) => true,
            _ => false,
        }
    }
}

impl Default for IOContext {
    fn default() -> Self {
        IOContext::DEFAULT
    }
}

impl fmt::Display for IOContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "IOContext [context={}", self.context_type())?;
        if let Some(info) = self.merge_info() {
            write!(f, ", mergeInfo={}", info)?;
        }
        if let Some(info) = self.flush_info() {
            write!(f, ", flushInfo={}", info)?;
        }
        write!(f, ", readOnce={}]", self.read_once())
    }
}

/// A FlushInfo provides information required for a FLUSH context.
///
/// It is used as part of an `IOContext` in case of FLUSH context.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct FlushInfo {
    num_docs: u32,
    estimated_segment_size: u64,
}

impl FlushInfo {
    pub fn new(num_docs: u32, estimated_segment_size: u64) -> Self {
        FlushInfo {
            num_docs,
            estimated_segment_size,
        }
    }

    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    pub fn estimated_segment_size(&self) -> u64 {
        self.estimated_segment_size
    }
}

impl fmt::Display for FlushInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "FlushInfo [numDocs={}, estimatedSegmentSize={}]",
            self.num_docs, self.estimated_segment_size
        )
    }
}

/// A MergeInfo provides information required for a MERGE context.
///
/// It is used as part of an `IOContext` in case of MERGE context.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub struct MergeInfo {
    total_max_doc: u32,
    estimated_merge_bytes: u64,
    is_external: bool,
    merge_max_num_segments: Option<u32>,
}

impl MergeInfo {
    pub fn new(
        total_max_doc: u32,
        estimated_merge_bytes: u64,
        is_external: bool,
        merge_max_num_segments: Option<u32>,
    ) -> Self {
        MergeInfo {
            total_max_doc,
            estimated_merge_bytes,
            is_external,
            merge_max_num_segments,
        }
    }

    pub fn total_max_doc(&self) -> u32 {
        self.total_max_doc
    }

    pub fn estimated_merge_bytes(&self) -> u64 {
        self.estimated_merge_bytes
    }

    pub fn is_external(&self) -> bool {
        self.is_external
    }

    pub fn merge_max_num_segments(&self) -> Option<u32> {
        self.merge_max_num_segments
    }
}

impl fmt::Display for MergeInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "MergeInfo [totalMaxDoc={}, estimatedMergeBytes={}, isExternal={}, \
             mergeMaxNumSegments={:?}]",
            self.total_max_doc,
            self.estimated_merge_bytes,
            self.is_external,
            self.merge_max_num_segments
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedicated_factories_require_info() {
        assert!(matches!(
            IOContext::for_flush(None),
            Err(Error::IllegalArgument(_))
        ));
        assert!(matches!(
            IOContext::for_merge(None),
            Err(Error::IllegalArgument(_))
        ));

        let flush = IOContext::for_flush(Some(FlushInfo::new(10, 4096))).unwrap();
        assert_eq!(flush.context_type(), IOContextType::Flush);
        assert_eq!(flush.flush_info().unwrap().num_docs(), 10);
        assert!(flush.merge_info().is_none());
        assert!(!flush.read_once());

        let merge = IOContext::for_merge(Some(MergeInfo::new(100, 1 << 20, false, Some(1))))
            .unwrap();
        assert!(merge.is_merge());
        assert_eq!(merge.merge_info().unwrap().merge_max_num_segments(), Some(1));
        assert!(merge.flush_info().is_none());
    }

    #[test]
    fn from_type_rejects_kinds_needing_info() {
        assert!(IOContext::from_type(IOContextType::Merge).is_err());
        assert!(IOContext::from_type(IOContextType::Flush).is_err());

        let read = IOContext::from_type(IOContextType::Read).unwrap();
        assert_eq!(read, IOContext::READ);
        assert!(read.merge_info().is_none() && read.flush_info().is_none());

        let default = IOContext::from_type(IOContextType::Default).unwrap();
        assert_eq!(default, IOContext::DEFAULT);
        assert!(default.merge_info().is_none() && default.flush_info().is_none());
    }

    #[test]
    fn read_once_contexts() {
        assert_eq!(IOContext::from_read_once(true), IOContext::READ_ONCE);
        assert_eq!(IOContext::from_read_once(false), IOContext::READ);
        assert!(IOContext::READ_ONCE.read_once());
        assert_eq!(IOContext::READ_ONCE.context_type(), IOContextType::Read);
        assert_eq!(IOContext::default(), IOContext::DEFAULT);
    }

    #[test]
    fn display() {
        assert_eq!(
            IOContext::READ_ONCE.to_string(),
            "IOContext [context=READ, readOnce=true]"
        );
        let flush = IOContext::Flush(FlushInfo::new(3, 12));
        assert_eq!(
            flush.to_string(),
            "IOContext [context=FLUSH, flushInfo=FlushInfo [numDocs=3, estimatedSegmentSize=12], \
             readOnce=false]"
        );
    }

    #[test]
    fn merge_info_serde() {
        let info = MergeInfo::new(7, 2048, true, None);
        let json = serde_json::to_string(&info).unwrap();
        let back: MergeInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);
    }
}
