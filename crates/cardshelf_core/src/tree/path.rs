//! Breadcrumb path resolution.

use crate::model::folder::{FolderId, PathSegment};
use crate::model::owner::OwnerId;
use crate::repo::tree_store::{FolderRepository, TreeRepoResult};
use log::warn;

/// Returns the root-first chain of `{id, name}` ending with `folder_id`.
///
/// A parent that cannot be loaded for `owner` is treated as the root
/// boundary. An unknown `folder_id` yields an empty path; callers that need
/// the folder to exist check it first.
pub fn resolve_path<R>(
    repo: &R,
    owner: &OwnerId,
    folder_id: FolderId,
) -> TreeRepoResult<Vec<PathSegment>>
where
    R: FolderRepository + ?Sized,
{
    let limit = repo.count_folders(owner)?;
    let mut path = Vec::new();
    let mut cursor = Some(folder_id);
    while let Some(current) = cursor {
        if path.len() as u64 >= limit {
            warn!(
                "event=path_resolve module=tree status=error error_code=walk_limit_exceeded folder_id={folder_id} limit={limit}"
            );
            break;
        }
        let Some(folder) = repo.get_folder(owner, current)? else {
            break;
        };
        cursor = folder.parent_id;
        path.push(folder.segment());
    }
    path.reverse();
    Ok(path)
}
