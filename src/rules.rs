use crate::{State, VarSet};

/// Common API for all representations of a Boolean function.
///
/// Expression trees, product terms and lists of implicants can all be evaluated in a [State]
/// and report the variables they depend on. Truth tables, Karnaugh maps and the
/// equivalence checks are written against this trait.
pub trait LogicFunction {
    /// Evaluate the function on the given state
    fn eval(&self, state: &State) -> bool;

    /// Add all variables used by the function to the set of variables
    fn collect_variables(&self, variables: &mut VarSet);

    /// Construct the set of variables used by the function
    fn get_variables(&self) -> VarSet {
        let mut variables = VarSet::default();
        self.collect_variables(&mut variables);
        variables
    }
}

impl<T: LogicFunction + ?Sized> LogicFunction for &T {
    fn eval(&self, state: &State) -> bool {
        (**self).eval(state)
    }

    fn collect_variables(&self, variables: &mut VarSet) {
        (**self).collect_variables(variables)
    }
}
