/// Something a sequence drives frame by frame.
///
/// Within a tick every player is animated before any player steps physics.
pub trait FramePlayer {
    /// Last frame this player has data for.
    fn end_frame(&self) -> u32;
    /// Poses the player at `frame`, which may be fractional.
    fn animate(&mut self, frame: f32);
    fn step_physics(&mut self, _delta: f32) {}
    /// Called after a discontinuous jump in time.
    fn reset_physics(&mut self) {}
}
