//! The hierarchical command tree: root menu, one sub-menu per movie, one
//! sub-menu per theatre within a movie.
//!
//! Built once per session from a snapshot of the catalog's movie/theatre names
//! in iteration order. Navigation is tracked purely by position (`Location`),
//! never by re-resolving a name against the (immutable, but still) catalog —
//! this is what lets leaf commands be plain position-keyed handlers instead of
//! closures capturing a name.

use std::collections::BTreeSet;

use colored::Colorize;

use crate::booker::BookerId;
use crate::catalog::Catalog;
use crate::cli::seat_list::{parse_seat_list, render_seat_list};
use crate::engine::ReservationEngine;

/// Where in the menu tree a session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Root,
    Movie(usize),
    Theatre(usize, usize),
}

/// Per-session CLI state: where we are in the tree, and whether to colorize output.
pub struct CliState {
    pub location: Location,
    pub use_color: bool,
}

impl CliState {
    pub fn new() -> Self {
        CliState { location: Location::Root, use_color: true }
    }
}

impl Default for CliState {
    fn default() -> Self {
        Self::new()
    }
}

/// The result of dispatching one input line.
pub struct DispatchOutcome {
    pub text: String,
    pub should_exit: bool,
}

fn line(text: impl Into<String>) -> DispatchOutcome {
    DispatchOutcome { text: text.into(), should_exit: false }
}

/// A positional snapshot of the catalog's movie and theatre names, captured at
/// session construction time.
pub struct CommandTree {
    movies: Vec<(String, Vec<String>)>,
}

impl CommandTree {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let movies = catalog
            .iter()
            .map(|(name, movie)| {
                let theatres = movie.with_theatres(|t| t.keys().cloned().collect());
                (name.clone(), theatres)
            })
            .collect();
        CommandTree { movies }
    }

    pub fn banner(&self) -> String {
        "Welcome to the box office. Type 'help' for commands, 'exit' to leave.".to_string()
    }

    fn prompt_path(&self, location: Location) -> String {
        match location {
            Location::Root => "/".to_string(),
            Location::Movie(m) => format!("/{}", self.movies[m].0),
            Location::Theatre(m, t) => format!("/{}/{}", self.movies[m].0, self.movies[m].1[t]),
        }
    }

    pub fn prompt(&self, state: &CliState) -> String {
        format!("{}> ", self.prompt_path(state.location))
    }

    fn ok(state: &CliState, text: impl std::fmt::Display) -> String {
        if state.use_color { format!("{}", text.to_string().green()) } else { text.to_string() }
    }

    fn warn(state: &CliState, text: impl std::fmt::Display) -> String {
        if state.use_color { format!("{}", text.to_string().yellow()) } else { text.to_string() }
    }

    fn err(state: &CliState, text: impl std::fmt::Display) -> String {
        if state.use_color { format!("{}", text.to_string().red()) } else { text.to_string() }
    }

    /// Dispatches one input line for `booker`, returning rendered text and
    /// whether the session should now close.
    pub fn dispatch(&self, state: &mut CliState, engine: &ReservationEngine, booker: &BookerId, input: &str) -> DispatchOutcome {
        let input = input.trim();
        let (cmd, arg) = match input.split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (input, ""),
        };

        if cmd.is_empty() {
            return line("");
        }

        match cmd {
            "exit" | "quit" => {
                // At the root this ends the session; inside a submenu it pops up one
                // level, the same way the nested-menu CLI library's built-in exit does.
                return match state.location {
                    Location::Root => DispatchOutcome { text: Self::ok(state, "Bye"), should_exit: true },
                    Location::Movie(_) => {
                        state.location = Location::Root;
                        line(self.prompt_path(state.location))
                    }
                    Location::Theatre(m, _) => {
                        state.location = Location::Movie(m);
                        line(self.prompt_path(state.location))
                    }
                };
            }
            "help" => return line(self.help_text(state.location)),
            "color" => {
                state.use_color = true;
                return line("color on");
            }
            "nocolor" => {
                state.use_color = false;
                return line("nocolor");
            }
            "status" if state.location == Location::Root => {
                return line(engine.dump_status());
            }
            _ => {}
        }

        match state.location {
            Location::Root => self.dispatch_root(state, cmd),
            Location::Movie(m) => self.dispatch_movie(state, m, cmd),
            Location::Theatre(m, t) => self.dispatch_theatre(state, engine, booker, m, t, cmd, arg),
        }
    }

    fn dispatch_root(&self, state: &mut CliState, cmd: &str) -> DispatchOutcome {
        if let Some(idx) = self.movies.iter().position(|(name, _)| name == cmd) {
            state.location = Location::Movie(idx);
            return line(self.prompt_path(state.location));
        }
        line(Self::err(state, format!("unknown command or movie: '{cmd}'")))
    }

    fn dispatch_movie(&self, state: &mut CliState, movie_idx: usize, cmd: &str) -> DispatchOutcome {
        if let Some(idx) = self.movies[movie_idx].1.iter().position(|name| name == cmd) {
            state.location = Location::Theatre(movie_idx, idx);
            return line(self.prompt_path(state.location));
        }
        line(Self::err(state, format!("unknown command or theatre: '{cmd}'")))
    }

    #[allow(clippy::too_many_arguments)]
    fn dispatch_theatre(
        &self,
        state: &mut CliState,
        engine: &ReservationEngine,
        booker: &BookerId,
        movie_idx: usize,
        theatre_idx: usize,
        cmd: &str,
        arg: &str,
    ) -> DispatchOutcome {
        let movie = &self.movies[movie_idx].0;
        let theatre = &self.movies[movie_idx].1[theatre_idx];

        match cmd {
            "seats" => match engine.free_seats(movie, theatre) {
                Ok(seats) => line(Self::ok(state, format!("free: {}", render_seat_list(&seats)))),
                Err(e) => line(Self::err(state, e.to_string())),
            },
            "status" => match engine.owned_seats(booker, movie, theatre) {
                Ok(seats) => line(Self::ok(state, format!("you own: {}", render_seat_list(&seats)))),
                Err(e) => line(Self::err(state, e.to_string())),
            },
            "book" | "trybook" => {
                let best_effort = cmd == "trybook";
                let seats = parse_seat_list(arg);
                match engine.book(booker, movie, theatre, &seats, best_effort) {
                    Ok(outcome) => {
                        let mut text = Self::ok(state, format!("booked, you now own {} seat(s)", outcome.owned_count));
                        if !outcome.unavailable.is_empty() {
                            let unavailable: BTreeSet<u32> = outcome.unavailable.into_iter().collect();
                            text.push('\n');
                            text.push_str(&Self::warn(state, format!("unavailable: {}", render_seat_list(&unavailable))));
                        }
                        line(text)
                    }
                    Err(e) => line(Self::err(state, e.to_string())),
                }
            }
            "unbook" => {
                let seats = parse_seat_list(arg);
                match engine.unbook(booker, movie, theatre, &seats) {
                    Ok(outcome) => {
                        let owned = engine.owned_seats(booker, movie, theatre).unwrap_or_default();
                        let mut text = Self::ok(
                            state,
                            format!("released {} seat(s), you now own {}", outcome.released, render_seat_list(&owned)),
                        );
                        if !outcome.invalid.is_empty() {
                            let invalid: BTreeSet<u32> = outcome.invalid.into_iter().collect();
                            text.push('\n');
                            text.push_str(&Self::warn(state, format!("invalid: {}", render_seat_list(&invalid))));
                        }
                        line(text)
                    }
                    Err(e) => line(Self::err(state, e.to_string())),
                }
            }
            _ => line(Self::err(state, format!("unknown command: '{cmd}'"))),
        }
    }

    fn help_text(&self, location: Location) -> String {
        match location {
            Location::Root => {
                let names: Vec<&str> = self.movies.iter().map(|(n, _)| n.as_str()).collect();
                format!("status, color, nocolor, help, exit, or a movie: {}", names.join(", "))
            }
            Location::Movie(m) => {
                let names: Vec<&str> = self.movies[m].1.iter().map(String::as_str).collect();
                format!("help, exit (back to root), or a theatre: {}", names.join(", "))
            }
            Location::Theatre(..) => "seats, book <list>, trybook <list>, unbook <list>, status, help, exit (back up)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::{ConfigRoot, MovieConfig};

    fn setup() -> (CommandTree, ReservationEngine, BookerId) {
        let config = ConfigRoot { movies: vec![MovieConfig { movie: "GodFather".into(), theatres: vec!["Delhi".into(), "Tokyo".into()] }] };
        let catalog = Catalog::load(config).unwrap();
        let tree = CommandTree::from_catalog(&catalog);
        let engine = ReservationEngine::new(catalog);
        let booker = BookerId::new();
        booker.set_uid("127.0.0.1:1@1".to_string());
        (tree, engine, booker)
    }

    #[test]
    fn navigates_into_movie_and_theatre() {
        let (tree, engine, booker) = setup();
        let mut state = CliState::new();
        state.use_color = false;

        assert_eq!(tree.dispatch(&mut state, &engine, &booker, "GodFather").text, "/GodFather");
        assert_eq!(state.location, Location::Movie(0));

        assert_eq!(tree.dispatch(&mut state, &engine, &booker, "Delhi").text, "/GodFather/Delhi");
        assert_eq!(state.location, Location::Theatre(0, 0));
    }

    #[test]
    fn book_and_seats_roundtrip() {
        let (tree, engine, booker) = setup();
        let mut state = CliState { location: Location::Theatre(0, 0), use_color: false };

        let out = tree.dispatch(&mut state, &engine, &booker, "book 1,2,3");
        assert!(out.text.contains("you now own 3 seat(s)"));

        let out = tree.dispatch(&mut state, &engine, &booker, "status");
        assert!(out.text.contains("1, 2, 3"));
    }

    #[test]
    fn unknown_movie_at_root_is_an_error() {
        let (tree, engine, booker) = setup();
        let mut state = CliState { location: Location::Root, use_color: false };
        let out = tree.dispatch(&mut state, &engine, &booker, "Nope");
        assert!(out.text.contains("unknown"));
        assert_eq!(state.location, Location::Root);
    }

    #[test]
    fn exit_ends_the_session() {
        let (tree, engine, booker) = setup();
        let mut state = CliState::new();
        let out = tree.dispatch(&mut state, &engine, &booker, "exit");
        assert!(out.should_exit);
    }

    #[test]
    fn exit_pops_up_one_level_instead_of_closing_when_not_at_root() {
        let (tree, engine, booker) = setup();
        let mut state = CliState { location: Location::Theatre(0, 0), use_color: false };

        let out = tree.dispatch(&mut state, &engine, &booker, "exit");
        assert!(!out.should_exit);
        assert_eq!(state.location, Location::Movie(0));

        let out = tree.dispatch(&mut state, &engine, &booker, "exit");
        assert!(!out.should_exit);
        assert_eq!(state.location, Location::Root);

        let out = tree.dispatch(&mut state, &engine, &booker, "exit");
        assert!(out.should_exit);
    }

    #[test]
    fn unbook_reports_remaining_ownership() {
        let (tree, engine, booker) = setup();
        let mut state = CliState { location: Location::Theatre(0, 0), use_color: false };

        tree.dispatch(&mut state, &engine, &booker, "book 1,2,3");
        let out = tree.dispatch(&mut state, &engine, &booker, "unbook 2");
        assert!(out.text.contains("released 1 seat(s)"));
        assert!(out.text.contains("you now own 1, 3"));
    }
}
