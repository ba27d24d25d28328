/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Interactive RNA secondary-structure editing engine.
//!
//! Nucleotides, base pairs, annotation labels and structural features live
//! in a [`graph::Structure`]. An [`app::EditorSession`] interprets pointer
//! and keyboard input against it, and an [`engine::EditorEngine`] journals
//! and autosaves every change. Drawing is left to the host.

pub mod app;
pub mod config;
pub mod engine;
pub mod graph;
pub mod input;
pub mod persistence;
pub mod seed;
