// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod aggregation;
pub mod compiler;
pub mod config;
pub mod event;
pub mod exception;
pub mod util;
