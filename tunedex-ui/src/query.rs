//! Pure view projections over canonical song state

use tunedex_common::model::Song;

/// Filter songs by case-insensitive substring match against the title.
///
/// An empty term returns every song. Canonical order is preserved: the
/// projection never re-sorts.
///
/// # Examples
/// ```
/// use tunedex_common::model::Song;
/// use tunedex_ui::query::filter_songs;
///
/// let songs = vec![
///     Song::new(1, "Yesterday", "The Beatles", "Lennon", "03:45"),
///     Song::new(2, "Today", "Smashing Pumpkins", "Corgan", "03:21"),
/// ];
///
/// assert_eq!(filter_songs(&songs, "day").len(), 2);
/// assert_eq!(filter_songs(&songs, "YESTER").len(), 1);
/// assert_eq!(filter_songs(&songs, "").len(), 2);
/// ```
pub fn filter_songs<'a>(songs: &'a [Song], term: &str) -> Vec<&'a Song> {
    if term.is_empty() {
        return songs.iter().collect();
    }

    let needle = term.to_lowercase();
    songs
        .iter()
        .filter(|song| song.title.to_lowercase().contains(&needle))
        .collect()
}
