/// What the pitch follower is doing with the incoming signal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FollowerState {
    /// The gate is closed and no note is playing.
    #[default]
    Idle,
    /// The gate is open, but the signal is too weak to be a note.
    Gated,
    /// A note is playing and the frequency follows the estimator.
    Tracking,
    /// The note has ended and the frequency glides toward recent values
    /// while waiting for the next note.
    Decaying,
}
