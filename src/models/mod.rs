// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Callout markers and the editing session that owns them.

pub mod marker;
pub mod session;
pub mod store;
