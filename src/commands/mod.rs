// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod calc;
pub mod exporter;
pub mod sessions;
pub mod settings;
pub mod sync;
pub mod transactions;
