// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for images, exploded view artifacts and their storage.

pub mod artifact;
pub mod media;
pub mod serialization;
pub mod storage;
