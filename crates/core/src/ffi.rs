//! C FFI bindings for embedding the solver

use core::ffi::{CStr, c_char};
use core::ptr;

use crate::challenge::{ChallengeKind, ChallengeParameters};
use crate::mt64::Mt64;
use crate::search::{CancelFlag, Solution};
use crate::solver::{ChallengeRequest, Solver};

/// Nonce written to the output buffer
pub const CSCOIN_STATUS_FOUND: i32 = 0;
/// Nonce space exhausted
pub const CSCOIN_STATUS_NOT_FOUND: i32 = 1;
/// Cancelled through the handle
pub const CSCOIN_STATUS_CANCELLED: i32 = 2;
/// Null pointer, bad UTF-8 or rejected challenge
pub const CSCOIN_STATUS_INVALID_INPUT: i32 = -1;
/// Output buffer cannot hold the nonce and its terminator
pub const CSCOIN_STATUS_BUFFER_TOO_SMALL: i32 = -2;

/// Opaque generator handle
pub struct CscoinMt64 {
    inner: Mt64,
}

/// Opaque cancellation handle
pub struct CscoinCancel {
    inner: CancelFlag,
}

/// Create an unseeded generator (caller must free with cscoin_mt64_free)
#[unsafe(no_mangle)]
pub extern "C" fn cscoin_mt64_new() -> *mut CscoinMt64 {
    Box::into_raw(Box::new(CscoinMt64 { inner: Mt64::new() }))
}

/// Free a generator
#[unsafe(no_mangle)]
pub extern "C" fn cscoin_mt64_free(mt: *mut CscoinMt64) {
    if !mt.is_null() {
        unsafe {
            let _ = Box::from_raw(mt);
        }
    }
}

/// Reseed a generator
#[unsafe(no_mangle)]
pub extern "C" fn cscoin_mt64_set_seed(mt: *mut CscoinMt64, seed: u64) {
    if mt.is_null() {
        return;
    }
    unsafe { (*mt).inner.set_seed(seed) }
}

/// Next value of the sequence, 0 for a null handle
#[unsafe(no_mangle)]
pub extern "C" fn cscoin_mt64_next_uint64(mt: *mut CscoinMt64) -> u64 {
    if mt.is_null() {
        return 0;
    }
    unsafe { (*mt).inner.next_u64() }
}

/// Create a cancellation handle (caller must free with cscoin_cancel_free)
#[unsafe(no_mangle)]
pub extern "C" fn cscoin_cancel_new() -> *mut CscoinCancel {
    Box::into_raw(Box::new(CscoinCancel {
        inner: CancelFlag::new(),
    }))
}

/// Request cancellation; safe to call from any thread
#[unsafe(no_mangle)]
pub extern "C" fn cscoin_cancel_trigger(cancel: *const CscoinCancel) {
    if !cancel.is_null() {
        unsafe { (*cancel).inner.cancel() }
    }
}

/// Free a cancellation handle
#[unsafe(no_mangle)]
pub extern "C" fn cscoin_cancel_free(cancel: *mut CscoinCancel) {
    if !cancel.is_null() {
        unsafe {
            let _ = Box::from_raw(cancel);
        }
    }
}

/// Solve a challenge, blocking until it settles
///
/// - challenge_type: 0 sorted list, 1 reverse sorted list, 2 shortest path
/// - param_a: nb_elements, or grid_size for shortest path
/// - param_b: nb_blockers for shortest path, ignored otherwise
/// - cancel: handle from cscoin_cancel_new(), may be null
/// - output: receives the NUL-terminated nonce on CSCOIN_STATUS_FOUND
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn cscoin_solve_challenge(
    challenge_id: u64,
    challenge_type: u32,
    last_solution_hash: *const c_char,
    hash_prefix: *const c_char,
    param_a: u32,
    param_b: u32,
    cancel: *const CscoinCancel,
    output: *mut c_char,
    output_len: usize,
) -> i32 {
    if last_solution_hash.is_null() || hash_prefix.is_null() || output.is_null() {
        return CSCOIN_STATUS_INVALID_INPUT;
    }

    let (last_solution_hash, hash_prefix) = unsafe {
        (
            CStr::from_ptr(last_solution_hash).to_str(),
            CStr::from_ptr(hash_prefix).to_str(),
        )
    };
    let (Ok(last_solution_hash), Ok(hash_prefix)) = (last_solution_hash, hash_prefix) else {
        return CSCOIN_STATUS_INVALID_INPUT;
    };

    let parameters = match ChallengeKind::try_from(challenge_type) {
        Ok(ChallengeKind::SortedList) => ChallengeParameters::sorted_list(param_a as usize),
        Ok(ChallengeKind::ReverseSortedList) => {
            ChallengeParameters::reverse_sorted_list(param_a as usize)
        }
        Ok(ChallengeKind::ShortestPath) => {
            ChallengeParameters::shortest_path(param_a as usize, param_b as usize)
        }
        Err(e) => Err(e),
    };
    let request = parameters.and_then(|parameters| {
        ChallengeRequest::new(challenge_id, last_solution_hash, hash_prefix, parameters)
    });
    let Ok(request) = request else {
        return CSCOIN_STATUS_INVALID_INPUT;
    };

    let cancel = if cancel.is_null() {
        CancelFlag::new()
    } else {
        unsafe { (*cancel).inner.clone() }
    };

    match Solver::new().solve(&request, &cancel) {
        Ok(Solution::Found(nonce)) => {
            if nonce.len() + 1 > output_len {
                return CSCOIN_STATUS_BUFFER_TOO_SMALL;
            }
            unsafe {
                ptr::copy_nonoverlapping(nonce.as_ptr(), output as *mut u8, nonce.len());
                *output.add(nonce.len()) = 0;
            }
            CSCOIN_STATUS_FOUND
        }
        Ok(Solution::NotFound) => CSCOIN_STATUS_NOT_FOUND,
        Ok(Solution::Cancelled) => CSCOIN_STATUS_CANCELLED,
        Err(_) => CSCOIN_STATUS_INVALID_INPUT,
    }
}
