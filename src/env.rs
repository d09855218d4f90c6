use std::{cell::RefCell, ffi::OsStr};

#[derive(Clone, Copy)]
struct Env {
    trace: bool,
    cycle_limit: Option<u64>,
}

thread_local! {
    /// Must only be mutated within `set_env`
    static ENV: RefCell<Option<Env>> = const { RefCell::new(None) };
}

pub fn init() {
    let value = Env {
        trace: var_is("ALTAIR_TRACE", "1"),
        cycle_limit: var_parse("ALTAIR_CYCLE_LIMIT"),
    };
    set_env(value);
}

/// `ALTAIR_TRACE=1`: print every instruction as it executes.
pub fn is_trace_enabled() -> bool {
    with_env(|env| env.trace)
}

/// `ALTAIR_CYCLE_LIMIT=<n>`: stop `run` after this many cycles. Ignored unless a number.
pub fn cycle_limit() -> Option<u64> {
    with_env(|env| env.cycle_limit)
}

fn set_env(value: Env) {
    ENV.with(|env| {
        let mut env = env.borrow_mut();
        assert!(
            env.is_none(),
            "tried to initialize environment state multiple times"
        );
        *env = Some(value);
    });
}

fn with_env<F, R>(callback: F) -> R
where
    F: Fn(&Env) -> R,
{
    ENV.with(|env| {
        let env = env.borrow();
        let env = env.unwrap_or_else(|| {
            panic!("tried to access environment state before initialization");
        });
        callback(&env)
    })
}

fn var_is(name: impl AsRef<OsStr>, value: impl AsRef<str>) -> bool {
    std::env::var(name.as_ref()).is_ok_and(|v| &v == value.as_ref())
}

fn var_parse(name: impl AsRef<OsStr>) -> Option<u64> {
    std::env::var(name.as_ref()).ok()?.trim().parse().ok()
}
