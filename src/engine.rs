//! The reservation engine: the transactional booking API over a [`Catalog`].

use std::collections::BTreeSet;

use crate::booker::BookerId;
use crate::catalog::{Catalog, Theatre, MAX_SEATS};
use crate::error::{Error, Result};

/// Result of a `book` call: the booker's total ownership in the theatre after the
/// call, and any requested seats that could not be granted.
#[derive(Debug, PartialEq, Eq)]
pub struct BookOutcome {
    pub owned_count: i32,
    pub unavailable: Vec<u32>,
}

/// Result of an `unbook` call: how many seats were actually released, and any
/// requested seats that were not owned by this booker.
#[derive(Debug, PartialEq, Eq)]
pub struct UnbookOutcome {
    pub released: i32,
    pub invalid: Vec<u32>,
}

/// Owns the [`Catalog`] and implements the booking contract over it.
///
/// Every method here acquires exactly one movie's lock for its duration and
/// never holds it across a suspension point — there are none, since every
/// engine call is synchronous.
pub struct ReservationEngine {
    catalog: Catalog,
}

impl ReservationEngine {
    pub fn new(catalog: Catalog) -> Self {
        ReservationEngine { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn validate_range(seats: &BTreeSet<u32>) -> Result<()> {
        if let Some(&seat) = seats.iter().find(|&&s| s >= MAX_SEATS) {
            return Err(Error::OutOfRange { seat, max: MAX_SEATS });
        }
        Ok(())
    }

    fn with_theatre<R>(&self, movie: &str, theatre: &str, f: impl FnOnce(&mut Theatre) -> Result<R>) -> Result<R> {
        let movie_ref = self.catalog.get(movie).ok_or_else(|| Error::NotFound(format!("movie '{movie}'")))?;
        movie_ref.with_theatres(|theatres| {
            let t = theatres.get_mut(theatre).ok_or_else(|| Error::NotFound(format!("theatre '{theatre}'")))?;
            f(t)
        })
    }

    /// Books `seats` for `booker` in `movie`/`theatre`.
    ///
    /// Strict (`best_effort = false`): grants all requested seats or none of
    /// them beyond what the booker already owned; any conflicting seat is
    /// reported in `unavailable` and rolled back.
    /// Best-effort: grants whichever requested seats were free or already
    /// self-owned, reporting the rest in `unavailable`.
    pub fn book(&self, booker: &BookerId, movie: &str, theatre: &str, seats: &BTreeSet<u32>, best_effort: bool) -> Result<BookOutcome> {
        Self::validate_range(seats)?;

        self.with_theatre(movie, theatre, |t| {
            let mut newly_reserved = BTreeSet::new();
            let mut unavailable = Vec::new();
            let already_owned = t.owned_by(booker.uid());

            for &seat in seats {
                if t.free.remove(&seat) {
                    newly_reserved.insert(seat);
                } else if already_owned.contains(&seat) || newly_reserved.contains(&seat) {
                    // no-op: re-requesting a seat we already hold
                } else {
                    unavailable.push(seat);
                }
            }

            if !unavailable.is_empty() && !best_effort {
                // roll back: nothing requested beyond what was already owned is granted
                t.free.extend(newly_reserved);
                return Ok(BookOutcome { owned_count: already_owned.len() as i32, unavailable });
            }

            if !newly_reserved.is_empty() {
                t.owned.entry(booker.uid().to_string()).or_default().extend(newly_reserved);
            }
            let owned_count = t.owned_by(booker.uid()).len() as i32;
            Ok(BookOutcome { owned_count, unavailable })
        })
    }

    /// Releases `seats` previously booked by `booker` in `movie`/`theatre`.
    pub fn unbook(&self, booker: &BookerId, movie: &str, theatre: &str, seats: &BTreeSet<u32>) -> Result<UnbookOutcome> {
        self.with_theatre(movie, theatre, |t| {
            if !t.owned.contains_key(booker.uid()) {
                return Ok(UnbookOutcome { released: 0, invalid: seats.iter().copied().collect() });
            }

            Self::validate_range(seats)?;

            let mut released = 0i32;
            let mut invalid = Vec::new();
            let owned_set = t.owned.get_mut(booker.uid()).expect("checked above");

            for &seat in seats {
                if owned_set.remove(&seat) {
                    t.free.insert(seat);
                    released += 1;
                } else {
                    invalid.push(seat);
                }
            }

            if t.owned.get(booker.uid()).is_some_and(BTreeSet::is_empty) {
                t.owned.remove(booker.uid());
            }

            Ok(UnbookOutcome { released, invalid })
        })
    }

    /// A copy of the theatre's currently free seats.
    pub fn free_seats(&self, movie: &str, theatre: &str) -> Result<BTreeSet<u32>> {
        self.with_theatre(movie, theatre, |t| Ok(t.free.clone()))
    }

    /// A copy of `booker`'s owned seats in this theatre (empty if none).
    pub fn owned_seats(&self, booker: &BookerId, movie: &str, theatre: &str) -> Result<BTreeSet<u32>> {
        self.with_theatre(movie, theatre, |t| Ok(t.owned_by(booker.uid())))
    }

    /// A human-readable rendering of every movie's theatres, free seats, and
    /// owned seats, one movie-lock acquisition at a time — an in-flight booking
    /// in one movie never blocks a status dump of another.
    pub fn dump_status(&self) -> String {
        use crate::cli::seat_list::render_seat_list;
        use std::fmt::Write;

        let mut out = String::new();
        for (name, movie) in self.catalog.iter() {
            let _ = writeln!(out, "{name}:");
            movie.with_theatres(|theatres| {
                for (theatre_name, theatre) in theatres.iter() {
                    let _ = writeln!(out, "  {theatre_name}: free = [{}]", render_seat_list(&theatre.free));
                    for (uid, seats) in &theatre.owned {
                        let _ = writeln!(out, "    {:<20} owns [{}]", uid, render_seat_list(seats));
                    }
                }
            });
        }
        out
    }
}
