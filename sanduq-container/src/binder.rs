//! Parameter binding.
//!
//! The rule is the same for constructors, setters, methods and free
//! functions: a positional parameter takes the next unused explicit
//! argument, an injected parameter is resolved through the container.
//! Running out of explicit arguments is not an error; the slot stays empty
//! and the factory decides what that means.

use tracing::trace;

use crate::component::{Param, Signature};
use crate::container::Container;
use crate::error::Result;
use crate::identifier::Identifier;
use crate::resolver::ResolutionStack;
use crate::value::{Argument, Arguments};

impl Container {
    pub(crate) fn bind_params(
        &self,
        owner: Option<&Identifier>,
        signature: &Signature,
        explicit: Vec<Argument>,
        stack: &mut ResolutionStack,
    ) -> Result<Arguments> {
        let supplied = explicit.len();
        let mut explicit = explicit.into_iter();
        let mut slots = Vec::with_capacity(signature.len());

        for param in signature.params() {
            let slot = match param {
                Param::Value { .. } => explicit.next(),
                Param::Inject { target, .. } => {
                    let instance = self.make_in(target.clone(), Vec::new(), false, stack)?;
                    Some(Argument::Instance(instance))
                }
            };
            slots.push(slot);
        }

        let arguments = Arguments::bound(owner.cloned(), slots);
        trace!(
            owner = owner.map(Identifier::as_str).unwrap_or("<function>"),
            params = signature.len(),
            supplied,
            filled = arguments.filled(),
            "Bound parameters"
        );
        Ok(arguments)
    }
}
