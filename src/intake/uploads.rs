use std::sync::Arc;

use tokio::task::JoinSet;

use crate::errors::StorageError;
use crate::models::registration::Attachment;
use crate::storage::{self, DocumentStore};

/// A document that reached storage, tagged with the member it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub member_index: usize,
    pub stored_name: String,
}

/// Aggregated result of an [`UploadBatch`].
#[derive(Debug)]
pub enum UploadOutcome {
    /// Every upload succeeded; sorted by member index.
    Complete(Vec<StoredUpload>),
    /// At least one upload failed. `orphaned` lists the files that were stored
    /// anyway and now have no registration row pointing at them.
    Partial {
        /// `None` when the failing task panicked before reporting its member.
        failed_member: Option<usize>,
        error: StorageError,
        orphaned: Vec<StoredUpload>,
    },
}

/// Parallel per-member uploads into one folder, joined all-or-fail.
pub struct UploadBatch {
    store: Arc<dyn DocumentStore>,
    folder_id: Arc<str>,
    tasks: JoinSet<(usize, Result<String, StorageError>)>,
}

impl UploadBatch {
    pub fn new(store: Arc<dyn DocumentStore>, folder_id: &str) -> Self {
        Self {
            store,
            folder_id: Arc::from(folder_id),
            tasks: JoinSet::new(),
        }
    }

    /// Start uploading `attachment` for the member at `member_index`.
    pub fn spawn(&mut self, member_index: usize, prefix: String, attachment: Attachment) {
        let store = Arc::clone(&self.store);
        let folder_id = Arc::clone(&self.folder_id);
        self.tasks.spawn(async move {
            let result = storage::upload_certificate(
                store.as_ref(),
                &folder_id,
                attachment.bytes,
                &attachment.file_name,
                &attachment.mime_type,
                &prefix,
            )
            .await;
            (member_index, result)
        });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every upload. Nothing is cancelled on failure, so the outcome
    /// accounts for each file that was stored.
    pub async fn join(mut self) -> UploadOutcome {
        let mut stored = Vec::with_capacity(self.tasks.len());
        let mut failure: Option<(Option<usize>, StorageError)> = None;

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok((member_index, Ok(stored_name))) => {
                    stored.push(StoredUpload { member_index, stored_name });
                }
                Ok((member_index, Err(e))) => {
                    if failure.is_none() {
                        failure = Some((Some(member_index), e));
                    } else {
                        log::error!("Upload for member {member_index} also failed: {e}");
                    }
                }
                Err(e) => {
                    log::error!("Upload task ended abnormally: {e}");
                    if failure.is_none() {
                        failure = Some((None, StorageError::Interrupted(e.to_string())));
                    }
                }
            }
        }

        stored.sort_by_key(|u| u.member_index);
        match failure {
            None => UploadOutcome::Complete(stored),
            Some((failed_member, error)) => UploadOutcome::Partial {
                failed_member,
                error,
                orphaned: stored,
            },
        }
    }
}
