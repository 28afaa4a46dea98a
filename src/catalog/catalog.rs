use std::collections::{BTreeMap, BTreeSet};

use super::movie::Movie;
use crate::config::ConfigRoot;
use crate::error::{Error, Result};

/// The root movie → [`Movie`] map. Fixed in shape once [`Catalog::load`] returns.
pub struct Catalog {
    movies: BTreeMap<String, Movie>,
}

impl Catalog {
    /// Builds a catalog from a parsed configuration tree.
    ///
    /// Duplicate movie names, duplicate theatre names within a movie, empty
    /// names, or an empty theatre list all fail the whole load — nothing is
    /// exposed to sessions until loading completes, since the listener doesn't
    /// open its port until after this returns.
    pub fn load(config: ConfigRoot) -> Result<Self> {
        let mut movies = BTreeMap::new();
        let mut seen_movie_names = BTreeSet::new();

        for entry in config.movies {
            if entry.movie.is_empty() {
                return Err(Error::BadMessage("movie name must not be empty".into()));
            }
            if entry.theatres.is_empty() {
                return Err(Error::BadMessage(format!("movie '{}' has no theatres", entry.movie)));
            }
            if !seen_movie_names.insert(entry.movie.clone()) {
                return Err(Error::Conflict(format!("duplicate movie name '{}'", entry.movie)));
            }

            let mut seen_theatre_names = BTreeSet::new();
            for theatre in &entry.theatres {
                if theatre.is_empty() {
                    return Err(Error::BadMessage(format!("movie '{}' has an empty theatre name", entry.movie)));
                }
                if !seen_theatre_names.insert(theatre.clone()) {
                    return Err(Error::Conflict(format!("duplicate theatre '{}' in movie '{}'", theatre, entry.movie)));
                }
            }

            movies.insert(entry.movie.clone(), Movie::new(entry.movie, entry.theatres));
        }

        Ok(Catalog { movies })
    }

    pub fn get(&self, movie: &str) -> Option<&Movie> {
        self.movies.get(movie)
    }

    /// Iterates movies in name order, for status dumps and similar whole-catalog sweeps.
    ///
    /// The outer map is immutable post-load, so no lock guards this iteration; only
    /// per-theatre access inside each [`Movie`] requires its own lock.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Movie)> {
        self.movies.iter()
    }
}
