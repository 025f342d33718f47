use crate::pitch::Program;

/// Lead voice of the bassline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timbre {
    /// Sawtooth lead: the normal state.
    Warm,
    /// Square lead: the screen is overloaded.
    Harsh,
}

impl Timbre {
    /// `Harsh` once more than `overload` particles are active.
    pub fn for_load(active: usize, overload: usize) -> Self {
        if active > overload { Timbre::Harsh } else { Timbre::Warm }
    }

    pub fn program(self) -> Program {
        match self {
            Timbre::Warm  => Program::Lead2Sawtooth,
            Timbre::Harsh => Program::Lead1Square,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overload_is_strictly_greater() {
        assert_eq!(Timbre::for_load(6000, 6000), Timbre::Warm);
        assert_eq!(Timbre::for_load(6001, 6000), Timbre::Harsh);
        assert_eq!(Timbre::Harsh.program(), Program::Lead1Square);
        assert_eq!(Timbre::Warm.program().number(), 81);
    }
}
