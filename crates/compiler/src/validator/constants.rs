/*!
 * Copyright 2025 Release Workshop Ltd
 * Licensed under the Elastic License 2.0; you may not use this file except in compliance with the Elastic License 2.0.
 * See the LICENSE file in the project root for details.
 */

/// Maximum percentage for variation weights and rollouts.
pub const MAX_PERCENTAGE: u32 = 100;

/// Minimum percentage for rollouts.
pub const MIN_PERCENTAGE: u32 = 0;

