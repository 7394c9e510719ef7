// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules. All functions take `&Database` and run on the
//! single writer thread.

pub mod events;
