//! Explore tour progress.

use serde::{Deserialize, Serialize};

use crate::catalog::{Tour, MAX_DEPTH};

use super::TransitionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitedStop {
    pub stop_id: String,
    pub depth: u8,
    pub image: Option<String>,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreState {
    pub current_stop: usize,
    /// 0 is the stop itself, 1 and 2 its deeper levels
    pub current_depth: u8,
    pub visited_stops: Vec<VisitedStop>,
    pub completed: bool,
}

impl ExploreState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a visit to `stop_index` at `depth` and make it current.
    pub fn visit(
        &self,
        tour: &Tour,
        stop_index: usize,
        depth: u8,
        image: Option<String>,
    ) -> Result<Self, TransitionError> {
        if self.completed {
            return Err(TransitionError::TourCompleted);
        }
        let stop = tour
            .stops
            .get(stop_index)
            .ok_or(TransitionError::NoSuchStop(stop_index))?;
        let view = stop
            .at_depth(depth)
            .ok_or(TransitionError::InvalidDepth(depth))?;

        let mut next = self.clone();
        next.current_stop = stop_index;
        next.current_depth = depth;
        next.visited_stops.push(VisitedStop {
            stop_id: stop.id.clone(),
            depth,
            image,
            title: view.title.to_string(),
        });
        Ok(next)
    }

    /// Whether the current stop has content one level deeper.
    pub fn can_go_deeper(&self, tour: &Tour) -> bool {
        self.go_deeper_target(tour).is_some()
    }

    /// `(stop_index, depth)` of the next deeper level, if any.
    pub fn go_deeper_target(&self, tour: &Tour) -> Option<(usize, u8)> {
        if self.completed || self.current_depth >= MAX_DEPTH {
            return None;
        }
        let depth = self.current_depth + 1;
        tour.stops
            .get(self.current_stop)
            .and_then(|stop| stop.at_depth(depth))
            .map(|_| (self.current_stop, depth))
    }

    /// Index of the following stop, or `None` on the last one.
    pub fn next_stop_index(&self, tour: &Tour) -> Option<usize> {
        let next = self.current_stop + 1;
        (next < tour.stops.len()).then_some(next)
    }

    /// Move on from the current stop.
    ///
    /// Past the last stop the tour is marked completed. Otherwise the caller
    /// follows up with [`visit`](Self::visit) at depth 0 of the returned
    /// stop index.
    pub fn next_stop(&self, tour: &Tour) -> Result<(Self, Option<usize>), TransitionError> {
        if self.completed {
            return Err(TransitionError::TourCompleted);
        }
        match self.next_stop_index(tour) {
            Some(index) => Ok((self.clone(), Some(index))),
            None => Ok((
                Self {
                    completed: true,
                    ..self.clone()
                },
                None,
            )),
        }
    }

    /// Titles of visited stops, in order, for generation context.
    pub fn previous_choices(&self) -> Vec<String> {
        self.visited_stops.iter().map(|v| v.title.clone()).collect()
    }
}
