/// A Mealy machine: `(State, Input) → (State, Vec<Output>)`.
///
/// The transition controller implements this so it can be driven and tested
/// without any runtime; the tile service interprets the outputs.
pub trait MealyMachine: Sized {
    type Input;
    type Output;
    fn transition(self, input: Self::Input) -> (Self, Vec<Self::Output>);
}
