//! Acyclicity check for folder reparenting.

use crate::model::folder::FolderId;
use crate::model::owner::OwnerId;
use crate::repo::tree_store::{FolderRepository, TreeRepoResult};
use log::warn;

/// Outcome of checking a folder move against the persisted forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveVerdict {
    Allowed,
    /// Candidate parent is the moving folder.
    IntoItself,
    /// Candidate parent sits inside the moving folder's subtree.
    IntoDescendant,
}

/// Classifies moving `moving` under `candidate_parent`.
///
/// Walks up from `candidate_parent`. A parent that cannot be loaded for
/// `owner` ends the walk as a root boundary. A walk longer than the owner's
/// folder count can only come from corrupt parent pointers and is reported
/// as `IntoDescendant`.
pub fn check_move<R>(
    repo: &R,
    owner: &OwnerId,
    moving: FolderId,
    candidate_parent: FolderId,
) -> TreeRepoResult<MoveVerdict>
where
    R: FolderRepository + ?Sized,
{
    if candidate_parent == moving {
        return Ok(MoveVerdict::IntoItself);
    }

    let limit = repo.count_folders(owner)?;
    let mut steps: u64 = 0;
    let mut cursor = Some(candidate_parent);
    while let Some(current) = cursor {
        if current == moving {
            return Ok(MoveVerdict::IntoDescendant);
        }
        let Some(folder) = repo.get_folder(owner, current)? else {
            break;
        };
        steps += 1;
        if steps > limit {
            warn!(
                "event=cycle_guard module=tree status=error error_code=walk_limit_exceeded folder_id={moving} limit={limit}"
            );
            return Ok(MoveVerdict::IntoDescendant);
        }
        cursor = folder.parent_id;
    }
    Ok(MoveVerdict::Allowed)
}

/// `true` when the move must be rejected.
pub fn would_create_cycle<R>(
    repo: &R,
    owner: &OwnerId,
    moving: FolderId,
    candidate_parent: FolderId,
) -> TreeRepoResult<bool>
where
    R: FolderRepository + ?Sized,
{
    Ok(check_move(repo, owner, moving, candidate_parent)? != MoveVerdict::Allowed)
}
