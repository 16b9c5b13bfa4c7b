/// A president and chancellor pair, by player index.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Government {
    pub president: usize,
    pub chancellor: usize,
}
