//! Mapping of upstream entities into the fixed tool output shapes.
//!
//! All optional upstream fields are defaulted here and nowhere else.

use crate::{
    error::EntityKind,
    models::{Album, Artist, Playlist, Track},
    types::{ArtistRef, TidalAlbum, TidalArtist, TidalPlaylist, TidalTrack},
    utils::{normalize_release_date, web_url},
};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

fn artist_name(primary: Option<&ArtistRef>, all: &[ArtistRef]) -> Option<String> {
    primary
        .and_then(|a| a.name.clone())
        .or_else(|| all.iter().find_map(|a| a.name.clone()))
}

/// Projects a track; `fallback_artist` replaces the placeholder when the
/// track carries no artist of its own.
pub fn track(track: TidalTrack, fallback_artist: Option<&str>) -> Track {
    let artist = artist_name(track.artist.as_ref(), &track.artists)
        .or_else(|| fallback_artist.map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
    let album = track
        .album
        .and_then(|a| a.title)
        .unwrap_or_else(|| UNKNOWN_ALBUM.to_string());

    Track {
        id: track.id.to_string(),
        url: web_url(EntityKind::Track, track.id),
        title: track.title,
        artist,
        album,
        duration_seconds: track.duration.unwrap_or(0),
    }
}

pub fn tracks(tracks: Vec<TidalTrack>, fallback_artist: Option<&str>) -> Vec<Track> {
    tracks
        .into_iter()
        .map(|t| self::track(t, fallback_artist))
        .collect()
}

pub fn album(album: TidalAlbum, fallback_artist: Option<&str>) -> Album {
    let artist = artist_name(album.artist.as_ref(), &album.artists)
        .or_else(|| fallback_artist.map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

    Album {
        id: album.id.to_string(),
        url: web_url(EntityKind::Album, album.id),
        title: album.title,
        artist,
        release_date: album
            .release_date
            .filter(|d| !d.trim().is_empty())
            .map(|d| normalize_release_date(&d)),
        num_tracks: album.number_of_tracks.unwrap_or(0),
        duration_seconds: album.duration.unwrap_or(0),
    }
}

pub fn albums(albums: Vec<TidalAlbum>, fallback_artist: Option<&str>) -> Vec<Album> {
    albums
        .into_iter()
        .map(|a| self::album(a, fallback_artist))
        .collect()
}

pub fn artist(artist: TidalArtist) -> Artist {
    Artist {
        id: artist.id.to_string(),
        url: web_url(EntityKind::Artist, artist.id),
        name: artist.name,
    }
}

pub fn artists(artists: Vec<TidalArtist>) -> Vec<Artist> {
    artists.into_iter().map(artist).collect()
}

/// `with_creator` is false for the user's own playlists, whose creator is implied.
pub fn playlist(playlist: TidalPlaylist, with_creator: bool) -> Playlist {
    let creator = if with_creator {
        playlist.creator.and_then(|c| c.name).filter(|n| !n.is_empty())
    } else {
        None
    };

    Playlist {
        url: web_url(EntityKind::Playlist, &playlist.uuid),
        id: playlist.uuid,
        name: playlist.title,
        description: playlist.description.unwrap_or_default(),
        track_count: playlist.number_of_tracks.unwrap_or(0),
        creator,
    }
}

pub fn playlists(playlists: Vec<TidalPlaylist>, with_creator: bool) -> Vec<Playlist> {
    playlists
        .into_iter()
        .map(|p| self::playlist(p, with_creator))
        .collect()
}
