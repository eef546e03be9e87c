use std::collections::HashSet;

use super::{TidalService, projection};
use crate::{
    error::{EntityKind, ToolError},
    models::{
        AddTracksResult, CreatePlaylistResult, DeletePlaylistResult, PlaylistList,
        PlaylistTracks, RemoveTracksResult, UpdatePlaylistResult, status_success,
    },
    types::{Authorized, TidalPlaylist},
    utils::{clamp_limit, parse_id, web_url},
};

pub const MAX_PLAYLISTS_LIMIT: u32 = 100;
pub const MAX_PLAYLIST_TRACKS_LIMIT: u32 = 1000;

/// What to remove from a playlist: track ids or 0-based positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    TrackIds(Vec<u64>),
    Indices(Vec<usize>),
}

impl Removal {
    /// Accepts exactly one of the two selectors; an empty list counts as absent.
    pub fn from_params(
        track_ids: Option<Vec<String>>,
        indices: Option<Vec<i64>>,
    ) -> Result<Self, ToolError> {
        let track_ids = track_ids.filter(|ids| !ids.is_empty());
        let indices = indices.filter(|idx| !idx.is_empty());

        match (track_ids, indices) {
            (None, None) => Err(ToolError::bad_request(
                "Must provide either track_ids or indices to remove",
            )),
            (Some(_), Some(_)) => Err(ToolError::bad_request(
                "Provide either track_ids or indices, not both",
            )),
            (Some(ids), None) => ids
                .iter()
                .map(|id| parse_id(EntityKind::Track, id))
                .collect::<Result<Vec<_>, _>>()
                .map(Removal::TrackIds),
            (None, Some(indices)) => indices
                .into_iter()
                .map(|i| {
                    usize::try_from(i)
                        .map_err(|_| ToolError::bad_request(format!("Invalid index: {i}")))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Removal::Indices),
        }
    }
}

/// Resolves each id to the position of its first not yet claimed occurrence.
fn positions_of(playlist_track_ids: &[u64], wanted: &[u64]) -> Result<Vec<usize>, ToolError> {
    let mut claimed = HashSet::new();
    wanted
        .iter()
        .map(|id| {
            playlist_track_ids
                .iter()
                .enumerate()
                .position(|(pos, track)| track == id && !claimed.contains(&pos))
                .inspect(|pos| {
                    claimed.insert(*pos);
                })
                .ok_or_else(|| ToolError::not_found(EntityKind::Track, id.to_string()))
        })
        .collect()
}

impl TidalService {
    async fn find_playlist(
        &self,
        auth: &Authorized,
        playlist_id: &str,
        context: &str,
    ) -> Result<TidalPlaylist, ToolError> {
        Self::lookup(
            EntityKind::Playlist,
            playlist_id,
            context,
            self.api.playlist(auth, playlist_id),
        )
        .await
    }

    pub async fn get_user_playlists(&self, limit: i64) -> Result<PlaylistList, ToolError> {
        let auth = self.sessions.ensure().await?;
        let limit = clamp_limit(limit, MAX_PLAYLISTS_LIMIT);

        let playlists = Self::remote(
            "Failed to get playlists",
            self.api.user_playlists(&auth, limit),
        )
        .await?;
        Ok(PlaylistList::new(
            None,
            projection::playlists(playlists, false),
        ))
    }

    pub async fn get_playlist_tracks(
        &self,
        playlist_id: &str,
        limit: i64,
    ) -> Result<PlaylistTracks, ToolError> {
        const CONTEXT: &str = "Failed to get playlist tracks";
        let auth = self.sessions.ensure().await?;
        let limit = clamp_limit(limit, MAX_PLAYLIST_TRACKS_LIMIT);

        let playlist = self.find_playlist(&auth, playlist_id, CONTEXT).await?;
        let tracks = Self::lookup(
            EntityKind::Playlist,
            playlist_id,
            CONTEXT,
            self.api.playlist_tracks(&auth, playlist_id, limit),
        )
        .await?;

        let tracks = projection::tracks(tracks, None);
        Ok(PlaylistTracks {
            status: status_success(),
            playlist_name: playlist.title,
            playlist_id: playlist_id.to_string(),
            count: tracks.len(),
            tracks,
        })
    }

    pub async fn create_playlist(
        &self,
        name: &str,
        description: &str,
    ) -> Result<CreatePlaylistResult, ToolError> {
        let auth = self.sessions.ensure().await?;
        if name.trim().is_empty() {
            return Err(ToolError::bad_request("Playlist name must not be empty"));
        }

        let created = Self::remote(
            "Failed to create playlist",
            self.api.create_playlist(&auth, name, description),
        )
        .await?;
        tracing::info!(playlist_id = %created.uuid, "Playlist created");

        let mut playlist = projection::playlist(created, false);
        playlist.track_count = 0;
        Ok(CreatePlaylistResult {
            status: status_success(),
            playlist: Some(playlist),
            message: format!("Created playlist '{name}'"),
        })
    }

    pub async fn add_tracks_to_playlist(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<AddTracksResult, ToolError> {
        const CONTEXT: &str = "Failed to add tracks";
        let auth = self.sessions.ensure().await?;
        if track_ids.is_empty() {
            return Err(ToolError::bad_request(
                "Must provide at least one track ID to add",
            ));
        }
        let ids = track_ids
            .iter()
            .map(|id| parse_id(EntityKind::Track, id))
            .collect::<Result<Vec<_>, _>>()?;

        let playlist = self.find_playlist(&auth, playlist_id, CONTEXT).await?;
        Self::remote(CONTEXT, self.api.add_playlist_tracks(&auth, playlist_id, &ids)).await?;

        Ok(AddTracksResult {
            status: status_success(),
            playlist_id: playlist_id.to_string(),
            tracks_added: ids.len(),
            playlist_url: web_url(EntityKind::Playlist, playlist_id),
            message: format!(
                "Added {} tracks to playlist '{}'",
                ids.len(),
                playlist.title
            ),
            playlist_name: playlist.title,
        })
    }

    pub async fn remove_tracks_from_playlist(
        &self,
        playlist_id: &str,
        track_ids: Option<Vec<String>>,
        indices: Option<Vec<i64>>,
    ) -> Result<RemoveTracksResult, ToolError> {
        const CONTEXT: &str = "Failed to remove tracks";
        let auth = self.sessions.ensure().await?;
        let removal = Removal::from_params(track_ids, indices)?;

        let playlist = self.find_playlist(&auth, playlist_id, CONTEXT).await?;
        let mut positions = match removal {
            Removal::Indices(indices) => {
                if let Some(total) = playlist.number_of_tracks
                    && let Some(bad) = indices.iter().find(|&&i| i >= total as usize)
                {
                    return Err(ToolError::bad_request(format!(
                        "Index {bad} is out of range for a playlist with {total} tracks"
                    )));
                }
                indices
            }
            Removal::TrackIds(ids) => {
                let current = Self::lookup(
                    EntityKind::Playlist,
                    playlist_id,
                    CONTEXT,
                    self.api.playlist_tracks(&auth, playlist_id, u32::MAX),
                )
                .await?;
                let current_ids: Vec<u64> = current.iter().map(|t| t.id).collect();
                positions_of(&current_ids, &ids)?
            }
        };
        positions.sort_unstable();
        positions.dedup();

        Self::remote(
            CONTEXT,
            self.api.remove_playlist_items(&auth, playlist_id, &positions),
        )
        .await?;

        let removed = positions.len();
        Ok(RemoveTracksResult {
            status: status_success(),
            playlist_id: playlist_id.to_string(),
            tracks_removed: removed,
            message: format!("Removed {removed} tracks from playlist '{}'", playlist.title),
            playlist_name: playlist.title,
        })
    }

    pub async fn update_playlist(
        &self,
        playlist_id: &str,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<UpdatePlaylistResult, ToolError> {
        const CONTEXT: &str = "Failed to update playlist";
        let auth = self.sessions.ensure().await?;
        let name = name.filter(|n| !n.trim().is_empty());
        if name.is_none() && description.is_none() {
            return Err(ToolError::bad_request(
                "Must provide at least name or description to update",
            ));
        }

        let current = self.find_playlist(&auth, playlist_id, CONTEXT).await?;
        let title = name.unwrap_or(current.title);
        let description = description.or(current.description).unwrap_or_default();

        Self::remote(
            CONTEXT,
            self.api.edit_playlist(&auth, playlist_id, &title, &description),
        )
        .await?;

        let updated = self.find_playlist(&auth, playlist_id, CONTEXT).await?;
        let playlist = projection::playlist(updated, false);
        Ok(UpdatePlaylistResult {
            status: status_success(),
            message: format!("Updated playlist '{}'", playlist.name),
            playlist: Some(playlist),
        })
    }

    pub async fn delete_playlist(
        &self,
        playlist_id: &str,
    ) -> Result<DeletePlaylistResult, ToolError> {
        const CONTEXT: &str = "Failed to delete playlist";
        let auth = self.sessions.ensure().await?;

        let playlist = self.find_playlist(&auth, playlist_id, CONTEXT).await?;
        Self::remote(CONTEXT, self.api.delete_playlist(&auth, playlist_id)).await?;
        tracing::info!(playlist_id, "Playlist deleted");

        Ok(DeletePlaylistResult {
            status: status_success(),
            playlist_id: playlist_id.to_string(),
            message: format!("Deleted playlist '{}'", playlist.title),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_ids_claim_successive_positions() {
        let positions = positions_of(&[7, 8, 7, 9], &[7, 7, 9]).unwrap();
        assert_eq!(positions, vec![0, 2, 3]);
    }

    #[test]
    fn absent_id_is_not_found() {
        let err = positions_of(&[1, 2], &[3]).unwrap_err();
        assert!(matches!(err, ToolError::NotFound { kind: EntityKind::Track, ref id } if id == "3"));
    }

    #[test]
    fn negative_index_is_bad_request() {
        let err = Removal::from_params(None, Some(vec![1, -2])).unwrap_err();
        assert!(matches!(err, ToolError::BadRequest(_)));
    }
}
