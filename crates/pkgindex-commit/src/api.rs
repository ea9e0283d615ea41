use crate::{
    error::Result,
    types::{CommitReceipt, CommitRequest},
};

/// Somewhere a multi-file commit can be applied.
///
/// Implementations apply every action of a request or none of them, and do
/// not retry on failure.
pub trait CommitApi {
    fn commit(&self, request: &CommitRequest) -> Result<CommitReceipt>;
}

impl<T: CommitApi + ?Sized> CommitApi for &T {
    fn commit(&self, request: &CommitRequest) -> Result<CommitReceipt> {
        (**self).commit(request)
    }
}

impl<T: CommitApi + ?Sized> CommitApi for Box<T> {
    fn commit(&self, request: &CommitRequest) -> Result<CommitReceipt> {
        (**self).commit(request)
    }
}
