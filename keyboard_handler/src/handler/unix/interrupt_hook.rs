// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words sigaction siginfo sigemptyset sighandler

//! `SIGINT` hook that restores the terminal mode before the process goes away.
//!
//! | Disposition before install | On `SIGINT`                                              |
//! |----------------------------|----------------------------------------------------------|
//! | `SIG_DFL`                  | restore mode, `_exit` (success only if restore worked)   |
//! | `SIG_IGN`                  | restore mode, stop capture                               |
//! | a handler                  | restore mode, stop capture, call the previous handler   |
//!
//! Everything reachable from [`on_interrupt`] is atomics, `tcsetattr`, `_exit`, or the
//! previous handler. No locks, no allocation.

use std::{io, mem, ptr,
          sync::atomic::{AtomicI32, AtomicUsize, Ordering}};

use libc::{SA_SIGINFO, SIG_DFL, SIG_ERR, SIG_IGN, SIGINT, c_int, c_void, sigaction,
           sighandler_t, siginfo_t};

use super::process_global;

/// `sa_sigaction` of the disposition that was in place before ours.
static PREVIOUS_HANDLER: AtomicUsize = AtomicUsize::new(SIG_DFL);
/// `sa_flags` of that disposition, to know which signature to call it with.
static PREVIOUS_FLAGS: AtomicI32 = AtomicI32::new(0);

type SimpleHandler = extern "C" fn(c_int);
type InfoHandler = extern "C" fn(c_int, *mut siginfo_t, *mut c_void);

extern "C" fn on_interrupt(signal: c_int, info: *mut siginfo_t, context: *mut c_void) {
    let previous = PREVIOUS_HANDLER.load(Ordering::SeqCst);

    if previous == SIG_DFL {
        let restored = process_global::restore_buffer_mode_for_stdin();
        signal_hook::low_level::exit(if restored {
            libc::EXIT_SUCCESS
        } else {
            libc::EXIT_FAILURE
        });
    }

    process_global::request_interrupt_exit();
    process_global::restore_buffer_mode_for_stdin();

    if previous == SIG_IGN || previous == SIG_ERR {
        return;
    }

    if PREVIOUS_FLAGS.load(Ordering::SeqCst) & SA_SIGINFO != 0 {
        // SAFETY: the kernel reported this value as an `sa_sigaction` installed with
        // `SA_SIGINFO`, which is this signature.
        let handler = unsafe { mem::transmute::<sighandler_t, InfoHandler>(previous) };
        handler(signal, info, context);
    } else {
        // SAFETY: without `SA_SIGINFO`, a value other than `SIG_DFL`, `SIG_IGN` or
        // `SIG_ERR` is an `sa_handler` function.
        let handler = unsafe { mem::transmute::<sighandler_t, SimpleHandler>(previous) };
        handler(signal);
    }
}

fn hook_address() -> sighandler_t {
    let hook: InfoHandler = on_interrupt;
    hook as sighandler_t
}

fn current_disposition() -> io::Result<sigaction> {
    // SAFETY: an all zero `sigaction` is a valid value for the kernel to overwrite.
    let mut current: sigaction = unsafe { mem::zeroed() };
    // SAFETY: a null new action only queries.
    let result = unsafe { libc::sigaction(SIGINT, ptr::null(), &raw mut current) };
    if result == 0 {
        Ok(current)
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Installed `SIGINT` hook. Dropping it puts the previous disposition back.
#[derive(Debug)]
pub(crate) struct InterruptHook {
    previous: sigaction,
}

impl InterruptHook {
    /// # Errors
    ///
    /// When `sigaction(2)` refuses the new disposition.
    pub(crate) fn install() -> io::Result<Self> {
        // SAFETY: all zero is a valid `sigaction`, the fields we need are set below.
        let mut action: sigaction = unsafe { mem::zeroed() };
        action.sa_sigaction = hook_address();
        action.sa_flags = SA_SIGINFO;
        // SAFETY: `sa_mask` is a valid, owned `sigset_t`.
        unsafe { libc::sigemptyset(&raw mut action.sa_mask) };

        // SAFETY: as above.
        let mut previous: sigaction = unsafe { mem::zeroed() };

        // Publish a placeholder first so a signal that lands between `sigaction` and the
        // stores below doesn't `_exit` a process that had its own handler.
        let current = current_disposition()?;
        PREVIOUS_HANDLER.store(current.sa_sigaction, Ordering::SeqCst);
        PREVIOUS_FLAGS.store(current.sa_flags, Ordering::SeqCst);

        // SAFETY: both pointers refer to valid `sigaction` values owned by this frame.
        let result = unsafe { libc::sigaction(SIGINT, &raw const action, &raw mut previous) };
        if result != 0 {
            return Err(io::Error::last_os_error());
        }

        PREVIOUS_HANDLER.store(previous.sa_sigaction, Ordering::SeqCst);
        PREVIOUS_FLAGS.store(previous.sa_flags, Ordering::SeqCst);
        Ok(Self { previous })
    }
}

impl Drop for InterruptHook {
    fn drop(&mut self) {
        // SAFETY: as in `current_disposition`.
        let mut replaced: sigaction = unsafe { mem::zeroed() };
        // SAFETY: both pointers refer to valid `sigaction` values.
        let result =
            unsafe { libc::sigaction(SIGINT, &raw const self.previous, &raw mut replaced) };
        if result != 0 {
            tracing::warn!(
                message = "failed to restore the previous SIGINT handler",
                error = ?io::Error::last_os_error()
            );
            return;
        }

        if replaced.sa_sigaction != hook_address() {
            // Someone installed their own handler over ours. Leave theirs in place.
            tracing::warn!(
                message = "SIGINT handler was replaced after the keyboard handler installed \
                           its own; keeping the replacement"
            );
            // SAFETY: `replaced` is the disposition the kernel just returned.
            unsafe { libc::sigaction(SIGINT, &raw const replaced, ptr::null_mut()) };
        }

        PREVIOUS_HANDLER.store(SIG_DFL, Ordering::SeqCst);
        PREVIOUS_FLAGS.store(0, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::{Arc, atomic::AtomicBool};

    static FORWARDED: AtomicUsize = AtomicUsize::new(0);

    extern "C" fn forwarded_handler(_signal: c_int) { FORWARDED.fetch_add(1, Ordering::SeqCst); }

    fn set_disposition(handler: sighandler_t) {
        // SAFETY: all zero is a valid `sigaction`.
        let mut action: sigaction = unsafe { mem::zeroed() };
        action.sa_sigaction = handler;
        // SAFETY: valid pointers, SIGINT is a catchable signal.
        let result = unsafe { libc::sigaction(SIGINT, &raw const action, ptr::null_mut()) };
        assert_eq!(result, 0);
    }

    fn current_handler() -> sighandler_t { current_disposition().unwrap().sa_sigaction }

    #[test]
    #[serial]
    fn test_install_and_drop_swap_dispositions() {
        set_disposition(SIG_IGN);

        let hook = InterruptHook::install().unwrap();
        assert_eq!(current_handler(), hook_address());
        assert_eq!(PREVIOUS_HANDLER.load(Ordering::SeqCst), SIG_IGN);

        drop(hook);
        assert_eq!(current_handler(), SIG_IGN);

        set_disposition(SIG_DFL);
    }

    #[test]
    #[serial]
    fn test_drop_keeps_a_third_party_replacement() {
        set_disposition(SIG_DFL);

        let hook = InterruptHook::install().unwrap();
        set_disposition(SIG_IGN);
        drop(hook);

        assert_eq!(current_handler(), SIG_IGN);

        set_disposition(SIG_DFL);
    }

    /// Raises `SIGINT` in a forked child while the default disposition was in place
    /// before the hook, and returns the child's exit status.
    fn exit_status_after_interrupt(restore_succeeds: bool) -> c_int {
        set_disposition(SIG_DFL);
        let saved_mode =
            process_global::publish_restore_action(Box::new(move || restore_succeeds));
        let hook = InterruptHook::install().unwrap();

        // SAFETY: the child only raises a signal and exits. It neither locks nor
        // allocates.
        let pid = unsafe { libc::fork() };
        assert!(pid >= 0);
        if pid == 0 {
            // SAFETY: forked child. The hook `_exit`s before `raise` returns.
            unsafe {
                libc::raise(SIGINT);
                libc::_exit(99);
            }
        }

        let mut status: c_int = 0;
        // SAFETY: `pid` is our child and `status` is a valid out pointer.
        let waited = unsafe { libc::waitpid(pid, &raw mut status, 0) };

        drop(hook);
        drop(saved_mode);
        set_disposition(SIG_DFL);

        assert_eq!(waited, pid);
        assert!(libc::WIFEXITED(status));
        libc::WEXITSTATUS(status)
    }

    #[test]
    #[serial]
    fn test_interrupt_with_default_disposition_exits_after_restore() {
        assert_eq!(exit_status_after_interrupt(true), libc::EXIT_SUCCESS);
    }

    #[test]
    #[serial]
    fn test_interrupt_with_default_disposition_exits_with_failure_when_restore_fails() {
        assert_eq!(exit_status_after_interrupt(false), libc::EXIT_FAILURE);
    }

    #[test]
    #[serial]
    fn test_interrupt_restores_mode_and_forwards_to_previous_handler() {
        let forwarded: SimpleHandler = forwarded_handler;
        set_disposition(forwarded as sighandler_t);
        FORWARDED.store(0, Ordering::SeqCst);
        process_global::clear_interrupt_exit_request();

        let restored = Arc::new(AtomicBool::new(false));
        let restored_clone = Arc::clone(&restored);
        let saved_mode = process_global::publish_restore_action(Box::new(move || {
            restored_clone.store(true, Ordering::SeqCst);
            true
        }));
        let hook = InterruptHook::install().unwrap();

        // SAFETY: delivered synchronously to this thread, where our hook handles it.
        assert_eq!(unsafe { libc::raise(SIGINT) }, 0);

        assert!(restored.load(Ordering::SeqCst));
        assert!(process_global::is_interrupt_exit_requested());
        assert_eq!(FORWARDED.load(Ordering::SeqCst), 1);

        drop(hook);
        drop(saved_mode);
        process_global::clear_interrupt_exit_request();
        set_disposition(SIG_DFL);
    }
}
