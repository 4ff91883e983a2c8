//! The frame loop contract between a frontend and the game: [`Model`] and
//! [`Effect`].
//!
//! A frontend owns the window and the palette. It feeds [`Msg`]s to the
//! model, asks it to draw into an indexed [`Surface`] and presents only the
//! returned dirty rectangle.

use crate::geom::Range;
use crate::messages::Msg;
use crate::surface::Surface;

/// A side-effect returned by [`Model::update`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// The model state changed; the frontend should draw a new frame.
    Redraw,
    /// Signal the frame loop to stop.
    End,
}

/// The game model driven by a frontend.
pub trait Model {
    /// Process a message, optionally returning a side-effect.
    fn update(&mut self, msg: Msg) -> Option<Effect>;

    /// Render the current state into `surface`, returning the sub-rectangle
    /// that was actually redrawn.
    fn draw(&mut self, surface: &mut Surface) -> Range;
}
