//! C interface with opaque handles
//!
//! Mirrors the Rust API for `f64` samples. Initialisers return a null handle
//! on failure, teardown functions take the address of the handle and null it,
//! and streaming calls report missing handles or buffers as
//! [`Status::NullPointer`]. Every handle must be released exactly once.

use crate::dsp::{AllpassFilterBank, Interpolation, ResamplePlan};
use crate::types::Status;
use std::os::raw::c_int;
use std::ptr;

/// Opaque resampling plan
pub type ResamplePlanHandle = *mut ResamplePlan<f64>;

/// Opaque filter bank
pub type FilterBankHandle = *mut AllpassFilterBank<f64>;

/// `0` linear, `1` Lagrange, `2` B-spline
fn interpolation_from_tag(tag: c_int) -> Option<Interpolation> {
    match tag {
        0 => Some(Interpolation::Linear),
        1 => Some(Interpolation::Lagrange),
        2 => Some(Interpolation::BSpline),
        _ => None,
    }
}

/// Build a slice from a C buffer, treating an empty request as valid
///
/// # Safety
/// A non-null `data` must point to `len` initialised samples.
unsafe fn buffer<'a>(data: *mut f64, len: usize) -> Option<&'a mut [f64]> {
    if len == 0 {
        Some(&mut [])
    } else if data.is_null() {
        None
    } else {
        Some(std::slice::from_raw_parts_mut(data, len))
    }
}

/// Create a plan; null on an unknown strategy or an invalid ratio
#[no_mangle]
pub extern "C" fn resample_init(restype: c_int, ratio: f64) -> ResamplePlanHandle {
    let Some(interpolation) = interpolation_from_tag(restype) else {
        log::error!("Unknown interpolation tag {}", restype);
        return ptr::null_mut();
    };

    match ResamplePlan::new(interpolation, ratio) {
        Ok(plan) => Box::into_raw(Box::new(plan)),
        Err(e) => {
            log::error!("Failed to create resample plan: {}", e);
            ptr::null_mut()
        }
    }
}

/// Resample `lin` samples from `input` into `lout` samples of `output`
///
/// # Safety
/// `rp` must be null or a live handle from [`resample_init`]. Non-null
/// buffers must hold `lin` and `lout` samples and must not overlap.
#[no_mangle]
pub unsafe extern "C" fn resample_execute(
    rp: ResamplePlanHandle,
    input: *mut f64,
    lin: usize,
    output: *mut f64,
    lout: usize,
) -> Status {
    let Some(plan) = rp.as_mut() else {
        return Status::NullPointer;
    };
    let (Some(input), Some(output)) = (buffer(input, lin), buffer(output, lout)) else {
        return Status::NullPointer;
    };
    plan.execute(input, output)
}

/// Output length the next call produces from `lin` inputs, 0 for a null plan
///
/// # Safety
/// `rp` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn resample_nextoutlen(rp: ResamplePlanHandle, lin: usize) -> usize {
    rp.as_ref().map_or(0, |plan| plan.next_output_len(lin))
}

/// Input length the next call needs for `lout` outputs, 0 for a null plan
///
/// # Safety
/// `rp` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn resample_nextinlen(rp: ResamplePlanHandle, lout: usize) -> usize {
    rp.as_ref().map_or(0, |plan| plan.next_input_len(lout))
}

/// # Safety
/// `rp` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn resample_advanceby(rp: ResamplePlanHandle, lin: usize, lout: usize) {
    if let Some(plan) = rp.as_mut() {
        plan.advance_by(lin, lout);
    }
}

/// # Safety
/// `rp` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn resample_reset(rp: ResamplePlanHandle) {
    if let Some(plan) = rp.as_mut() {
        plan.reset();
    }
}

/// Release a plan and null the caller's handle
///
/// # Safety
/// `rp` must be null or point to a handle that is null or live.
#[no_mangle]
pub unsafe extern "C" fn resample_done(rp: *mut ResamplePlanHandle) {
    if let Some(handle) = rp.as_mut() {
        if !handle.is_null() {
            Box::from_raw(*handle).done();
        }
        *handle = ptr::null_mut();
    }
}

/// Create a filter bank; null unless `0 < fc < 1`
#[no_mangle]
pub extern "C" fn emqffilters_init(fc: f64) -> FilterBankHandle {
    match AllpassFilterBank::new(fc) {
        Ok(bank) => Box::into_raw(Box::new(bank)),
        Err(e) => {
            log::error!("Failed to create EMQF filter bank: {}", e);
            ptr::null_mut()
        }
    }
}

/// Filter `lin` samples from `input` into `output`
///
/// # Safety
/// `ef` must be null or a live handle. Non-null buffers must hold `lin`
/// samples; `input` and `output` may be the same buffer.
#[no_mangle]
pub unsafe extern "C" fn emqffilters_dofilter(
    ef: FilterBankHandle,
    input: *const f64,
    lin: usize,
    output: *mut f64,
) {
    let Some(bank) = ef.as_mut() else {
        return;
    };
    if lin == 0 || input.is_null() || output.is_null() {
        return;
    }
    // Sample by sample through raw pointers so in-place calls stay sound
    for i in 0..lin {
        let x = *input.add(i);
        *output.add(i) = bank.process(x);
    }
}

/// Release a filter bank and null the caller's handle
///
/// # Safety
/// `ef` must be null or point to a handle that is null or live.
#[no_mangle]
pub unsafe extern "C" fn emqffilters_done(ef: *mut FilterBankHandle) {
    if let Some(handle) = ef.as_mut() {
        if !handle.is_null() {
            Box::from_raw(*handle).done();
        }
        *handle = ptr::null_mut();
    }
}
