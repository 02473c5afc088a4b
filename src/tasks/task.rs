/// One input undergoing execution.
///
/// Created when the scheduler dequeues an input, mutated only by the retry
/// actor (`attempts_used`), discarded once its result is written.
#[derive(Debug)]
pub(crate) struct Task<T> {
    /// Zero-based position of the input (and of its result slot).
    pub index: usize,
    /// The input handed to the unit of work on every attempt.
    pub input: T,
    /// Attempts started so far.
    pub attempts_used: u32,
}

impl<T> Task<T> {
    pub fn new(index: usize, input: T) -> Self {
        Self {
            index,
            input,
            attempts_used: 0,
        }
    }
}
