//! Typed physical quantities used throughout the channel model.
//!
//! Logarithmic quantities (`Db<T>`) are generic over the linear unit they
//! represent so that adding a dB ratio to a dBm power is type-checked: the
//! `Add`/`Sub` impls below only exist when the underlying linear units
//! actually compose that way (`T: Mul<A>` / `T: Div<A>`).

use std::{
    fmt::Display,
    iter::Sum,
    marker::PhantomData,
    ops::{Add, Div, Mul, Neg, Rem, Sub},
};

use serde::{Deserialize, Serialize};

pub trait Unit: Into<f64> {
    fn inner(self) -> f64 {
        self.into()
    }
}

macro_rules! Quantity {
    ($name: ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
        pub struct $name(f64);

        impl From<f64> for $name {
            fn from(value: f64) -> Self {
                $name(value)
            }
        }

        impl From<$name> for f64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl Unit for $name {}

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl Add for $name {
            type Output = $name;

            fn add(self, rhs: Self) -> Self::Output {
                $name(self.0 + rhs.0)
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold($name(0.0), |a, b| a + b)
            }
        }

        impl Sub for $name {
            type Output = $name;

            fn sub(self, rhs: Self) -> Self::Output {
                $name(self.0 - rhs.0)
            }
        }

        impl Neg for $name {
            type Output = $name;

            fn neg(self) -> Self::Output {
                $name(-self.0)
            }
        }

        impl Div for $name {
            type Output = f64;

            fn div(self, rhs: Self) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl Div<f64> for $name {
            type Output = $name;

            fn div(self, rhs: f64) -> Self::Output {
                $name(self.0 / rhs)
            }
        }

        impl Mul<f64> for $name {
            type Output = $name;

            fn mul(self, rhs: f64) -> Self::Output {
                $name(self.0 * rhs)
            }
        }

        impl Mul<$name> for f64 {
            type Output = $name;

            fn mul(self, rhs: $name) -> Self::Output {
                $name(self * rhs.0)
            }
        }

        impl Rem for $name {
            type Output = $name;

            fn rem(self, rhs: Self) -> Self::Output {
                $name(self.0 % rhs.0)
            }
        }

        impl $name {
            #[inline]
            pub fn map<F>(self, f: F) -> Self
            where
                F: FnOnce(f64) -> f64,
            {
                Self(f(self.0))
            }

            /// Strictly this should change the unit but doesn't.
            pub fn powi(self, exp: i32) -> Self {
                Self(self.0.powi(exp))
            }

            /// Strictly this should change the unit but doesn't.
            pub fn sqrt(self) -> Self {
                Self(self.0.sqrt())
            }

            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }

            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }

            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }
    };
}

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Db<T>(f64, #[serde(skip)] PhantomData<T>);

impl<T, A> Add<Db<A>> for Db<T>
where
    T: Mul<A>,
{
    type Output = Db<T::Output>;

    fn add(self, rhs: Db<A>) -> Self::Output {
        Db::<T::Output>::from(self.0 + rhs.0)
    }
}

impl<T, A> Sub<Db<A>> for Db<T>
where
    T: Div<A>,
{
    type Output = Db<T::Output>;

    fn sub(self, rhs: Db<A>) -> Self::Output {
        Db::<T::Output>::from(self.0 - rhs.0)
    }
}

impl<T> From<f64> for Db<T> {
    fn from(value: f64) -> Self {
        Self(value, PhantomData)
    }
}

impl<T> From<Db<T>> for f64 {
    fn from(value: Db<T>) -> Self {
        value.0
    }
}

impl<T> From<T> for Db<T>
where
    T: Unit,
{
    fn from(value: T) -> Self {
        let log = 10.0 * value.inner().log10();
        Self(log, PhantomData)
    }
}

impl<T> Db<T>
where
    T: From<f64> + Into<f64>,
{
    pub fn as_linear(self) -> T {
        T::from(10f64.powf(self.0 / 10.0))
    }

    pub fn as_db_float(self) -> f64 {
        self.0
    }

    fn from_linear(val: f64) -> Self {
        let log = 10.0 * val.log10();
        Db::from(log)
    }

    /// From the equivalent non-logarithmic unit.
    /// This will apply the `10 * log(value)` transform.
    pub fn from_unit(val: T) -> Self {
        Self::from_linear(val.into())
    }

    const fn from_db(val: f64) -> Self {
        Self(val, PhantomData)
    }

    #[inline]
    pub fn map<F>(self, f: F) -> Self
    where
        F: FnOnce(f64) -> f64,
    {
        Self::from(f(self.0))
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    pub fn min(self, other: Self) -> Self {
        Self::from_db(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Self::from_db(self.0.max(other.0))
    }
}

impl<T> Mul<f64> for Db<T> {
    type Output = Db<T>;

    fn mul(self, rhs: f64) -> Self::Output {
        Db::from(self.0 * rhs)
    }
}

impl<T> Mul<Db<T>> for f64 {
    type Output = Db<T>;

    fn mul(self, rhs: Db<T>) -> Self::Output {
        Db::from(self * rhs.0)
    }
}

Quantity!(Length);
pub const METRES: Length = Length::from_metres(1.0);
impl Length {
    pub const fn from_metres(n: f64) -> Self {
        Length(n)
    }

    pub fn metres(self) -> f64 {
        self.0
    }
}

Quantity!(Time);
pub const SECONDS: Time = Time::from_seconds(1.0);
impl Time {
    pub const fn from_seconds(n: f64) -> Self {
        Time(n)
    }

    pub const fn from_nanos(n: f64) -> Self {
        Time(n / 1_000_000_000.0)
    }

    pub fn seconds(self) -> f64 {
        self.0
    }

    pub fn nanos(self) -> f64 {
        self.0 * 1_000_000_000.0
    }

    pub fn millis(self) -> f64 {
        self.0 * 1000.0
    }
}

Quantity!(Power);
Quantity!(Frequency);
impl Frequency {
    pub const fn from_hz(n: f64) -> Self {
        Frequency(n)
    }

    #[allow(non_snake_case)]
    pub const fn from_MHz(n: f64) -> Self {
        Frequency(n * 1_000_000.0)
    }

    #[allow(non_snake_case)]
    pub const fn from_GHz(n: f64) -> Self {
        Frequency(n * 1_000_000_000.0)
    }

    pub fn hz(self) -> f64 {
        self.0
    }

    #[allow(non_snake_case)]
    pub fn MHz(self) -> f64 {
        self.0 / 1_000_000.0
    }
}

/// Speed of light in a vacuum, used for propagation-delay calculations.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

// Internally a Db<Power> is dB-Watts; the `dbm`/`from_dbm` helpers shift by
// the 30 dB offset between watts and milliwatts so callers only ever see dBm.
pub type Dbm = Db<Power>;
impl Dbm {
    pub const fn from_dbm(n: f64) -> Self {
        Self::from_db(n - 30.0)
    }

    pub const fn dbm(self) -> f64 {
        self.0 + 30.0
    }
}

/// A unitless logarithmic ratio: SNR/SINR margins, antenna gain, path loss.
pub type Dbf = Db<f64>;
impl Dbf {
    /// Specifically allowed because this is unitless.
    pub const fn from_db_value(n: f64) -> Self {
        Db::from_db(n)
    }

    pub fn db_value(self) -> f64 {
        self.0
    }
}

/// Antenna gain over isotropic; behaves exactly like [`Dbf`] since it is
/// dimensionless, but the alias documents intent at call sites.
pub type Dbi = Dbf;
