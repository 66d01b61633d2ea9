// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`Pool`] trait seen by a resource-management control loop.

use crate::ControlError;

/// A controllable volume of some resource.
///
/// `supply` is what is currently provided, `demand` is what the controller
/// asks for. `utilisation` and `allocation` are fractions of the supply.
/// Every read goes through the cached views, so polling a pool in a tight
/// loop costs at most one query per view TTL.
pub trait Pool: Send + Sync {
    /// The resource this pool provides.
    fn resource(&self) -> &str;

    /// Volume currently provided.
    fn supply(&self) -> Result<f64, ControlError>;

    /// Volume currently requested.
    fn demand(&self) -> Result<f64, ControlError>;

    /// Requests a new volume.
    fn set_demand(&self, value: f64) -> Result<(), ControlError>;

    /// Fraction of the supply that is in use.
    fn utilisation(&self) -> Result<f64, ControlError>;

    /// Fraction of the supply that is allocated.
    ///
    /// Concurrency limits do not distinguish allocation from use.
    fn allocation(&self) -> Result<f64, ControlError> {
        self.utilisation()
    }

    /// Reads all four quantities at once.
    fn report(&self) -> Result<PoolReport, ControlError> {
        Ok(PoolReport {
            resource: self.resource().to_string(),
            supply: self.supply()?,
            demand: self.demand()?,
            utilisation: self.utilisation()?,
            allocation: self.allocation()?,
        })
    }
}

/// A point-in-time reading of a [`Pool`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PoolReport {
    pub resource: String,
    pub supply: f64,
    pub demand: f64,
    pub utilisation: f64,
    pub allocation: f64,
}

/// `used / supply`, refusing a zero supply instead of yielding inf or NaN.
pub(crate) fn fraction(resource: &str, used: f64, supply: f64) -> Result<f64, ControlError> {
    if supply == 0.0 {
        return Err(ControlError::ZeroSupply {
            resource: resource.to_string(),
        });
    }
    Ok(used / supply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction() {
        assert_eq!(fraction("gpu", 2.0, 8.0), Ok(0.25));
        assert_eq!(fraction("gpu", 0.0, 8.0), Ok(0.0));
    }

    #[test]
    fn test_fraction_zero_supply() {
        assert_eq!(
            fraction("gpu", 2.0, 0.0),
            Err(ControlError::ZeroSupply { resource: "gpu".into() })
        );
    }

    #[test]
    fn test_fraction_negative_supply_is_allowed() {
        // An opposing limit above the total leaves a negative supply.
        assert_eq!(fraction("cloud", 2.0, -4.0), Ok(-0.5));
    }
}
