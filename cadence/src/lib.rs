// Copyright 2026 The Cadence Authors
// SPDX-License-Identifier: Apache-2.0

pub mod chunk;
pub mod config;
pub mod humanize;
pub mod message;
pub mod pacer;
pub mod segment;
pub mod session;
pub mod sink;

#[cfg(test)]
mod test_support;
