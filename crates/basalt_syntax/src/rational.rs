/// An exact rational value as scanned from a numeric literal. The fraction is
/// kept in lowest terms at all times. Arithmetic saturates at the `i64` range
/// rather than wrapping, so a pathological exponent cannot panic the lexer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Rational {
    numerator: i64,
    denominator: i64,
}

impl Rational {
    pub fn new(numerator: i64, denominator: i64) -> Self {
        debug_assert!(denominator != 0, "rational with zero denominator");
        let mut value = Self {
            numerator,
            denominator,
        };
        value.simplify();
        value
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn is_integer(&self) -> bool {
        self.denominator == 1
    }

    /// Multiply by an integer scale, reducing the result.
    pub fn scale_up(&mut self, scale: i64) {
        self.numerator = self.numerator.saturating_mul(scale);
        self.simplify();
    }

    /// Divide by an integer scale, reducing the result.
    pub fn scale_down(&mut self, scale: i64) {
        debug_assert!(scale != 0, "rational scaled down by zero");
        self.denominator = self.denominator.saturating_mul(scale);
        self.simplify();
    }

    fn simplify(&mut self) {
        let divisor = gcd(self.numerator.unsigned_abs(), self.denominator.unsigned_abs());
        if divisor > 1 {
            self.numerator /= divisor as i64;
            self.denominator /= divisor as i64;
        }
        if self.denominator < 0 {
            self.numerator = -self.numerator;
            self.denominator = -self.denominator;
        }
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self {
            numerator: 0,
            denominator: 1,
        }
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self {
            numerator: value,
            denominator: 1,
        }
    }
}

impl std::fmt::Display for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.numerator)?;
        if self.denominator != 1 {
            write!(f, "/{}", self.denominator)?;
        }
        Ok(())
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a.max(1)
}

#[cfg(test)]
mod test {
    use super::Rational;
    use test_case::test_case;

    #[test_case(3, 2, 3, 2)]
    #[test_case(4, 2, 2, 1)]
    #[test_case(0, 5, 0, 1)]
    #[test_case(10, 100, 1, 10)]
    #[test_case(-4, 8, -1, 2)]
    fn reduces(n: i64, d: i64, rn: i64, rd: i64) {
        let value = Rational::new(n, d);
        assert_eq!(value.numerator(), rn);
        assert_eq!(value.denominator(), rd);
    }

    #[test]
    fn scaling() {
        // 1.5 scaled the way the lexer computes `1.5e2`: 15 / 10 * 100.
        let mut value = Rational::from(15);
        value.scale_down(10);
        value.scale_up(100);
        assert_eq!(value, Rational::from(150));
    }

    #[test]
    fn display() {
        assert_eq!(Rational::new(3, 2).to_string(), "3/2");
        assert_eq!(Rational::from(5).to_string(), "5");
    }
}
