//! Message-call driver.
//!
//! Runs a whole call tree in one loop. Suspended callers wait on a heap
//! stack, so nesting is bounded by `max_call_depth` and gas, not by the
//! native thread stack.

use crate::config::EvmConfig;
use crate::error::ExecutionResult;
use crate::frame::CallContext;
use crate::host::{CallInputs, CallOutcome, EnteredCall, Host};
use crate::interpreter::{Interpreter, InterpreterAction};

/// An entered call and the checkpoint that closes it
struct ActiveCall<C> {
    interpreter: Interpreter,
    checkpoint: C,
}

impl<C> ActiveCall<C> {
    fn exit<H>(self, host: &mut H, result: ExecutionResult) -> CallOutcome
    where
        H: Host<Checkpoint = C> + ?Sized,
    {
        host.exit_call(self.checkpoint, &result);
        result.into()
    }
}

fn enter<H: Host + ?Sized>(
    host: &mut H,
    inputs: CallInputs,
    config: &EvmConfig,
) -> Result<ActiveCall<H::Checkpoint>, CallOutcome> {
    let EnteredCall { code, checkpoint } = host.enter_call(&inputs)?;

    let mut context = CallContext::new(
        inputs.address,
        inputs.caller,
        inputs.value,
        inputs.input,
        inputs.gas_limit,
    )
    .with_depth(inputs.depth);
    context.is_static = inputs.is_static;

    Ok(ActiveCall {
        interpreter: Interpreter::new(code, context, config.clone()),
        checkpoint,
    })
}

/// Run `inputs` and every call it makes, returning the outermost outcome.
///
/// Each call is opened with [`Host::enter_call`] and closed with
/// [`Host::exit_call`] before its caller resumes.
pub fn execute_call<H: Host + ?Sized>(
    host: &mut H,
    inputs: CallInputs,
    config: &EvmConfig,
) -> CallOutcome {
    let mut root = match enter(host, inputs, config) {
        Ok(call) => call,
        Err(outcome) => return outcome,
    };
    let mut callees: Vec<ActiveCall<H::Checkpoint>> = Vec::new();

    loop {
        let active = callees.last_mut().unwrap_or(&mut root);
        let outcome = match active.interpreter.run(host) {
            InterpreterAction::Call(inputs) => match enter(host, inputs, config) {
                Ok(callee) => {
                    callees.push(callee);
                    continue;
                }
                Err(outcome) => outcome,
            },
            InterpreterAction::Return(result) => match callees.pop() {
                Some(callee) => callee.exit(host, result),
                None => return root.exit(host, result),
            },
        };

        callees
            .last_mut()
            .unwrap_or(&mut root)
            .interpreter
            .resume_call(outcome);
    }
}
