use rust_decimal::Decimal;

/// Total digits a stored monetary amount may carry.
pub const DECIMAL_MAX_DIGITS: u32 = 18;
/// Fractional digits a stored monetary amount may carry.
pub const DECIMAL_PLACES: u32 = 3;

pub const DEFAULT_MIN_DECIMALS: u32 = 2;
/// Upper bound for `min_decimals` accepted from configuration.
pub const MAX_MIN_DECIMALS: u32 = DECIMAL_PLACES + 1;

/// Rounds `value` half-even to [`DECIMAL_PLACES`] and checks that the result
/// still fits [`DECIMAL_MAX_DIGITS`] digits.
pub fn to_storage(value: Decimal) -> Option<Decimal> {
    let rounded = value.round_dp(DECIMAL_PLACES);
    is_storable(rounded).then_some(rounded)
}

/// Whether `value` can be stored without losing digits.
pub fn is_storable(value: Decimal) -> bool {
    let integer_digits_bound = Decimal::from(10_i64.pow(DECIMAL_MAX_DIGITS - DECIMAL_PLACES));
    value.scale() <= DECIMAL_PLACES && value.abs() < integer_digits_bound
}

/// [`format_decimal_with`] using two minimum decimals.
pub fn format_decimal(value: Option<Decimal>) -> String {
    format_decimal_with(value, DEFAULT_MIN_DECIMALS)
}

/// Renders a stored amount for display.
///
/// Amounts whose thousandths digit is zero are shown with two decimals,
/// everything else with three. Trailing zeros are then dropped, but never
/// below `min_decimals`.
///
/// ```
/// use rust_decimal::Decimal;
/// use wtn_ledger::display::format_decimal;
///
/// assert_eq!(format_decimal(Some(Decimal::new(25_100, 3))), "25.10");
/// assert_eq!(format_decimal(Some(Decimal::new(25_225, 3))), "25.225");
/// assert_eq!(format_decimal(None), "0.00");
/// ```
pub fn format_decimal_with(value: Option<Decimal>, min_decimals: u32) -> String {
    let Some(value) = value else {
        return "0.00".to_string();
    };

    let places = if thousandths_digit_is_zero(value) {
        2
    } else {
        3
    };
    let mut rounded = value.round_dp(places);
    // round_dp only lowers the scale, so this pads with zeros
    rounded.rescale(places);
    let rendered = rounded.to_string();

    let (integer_part, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let mut fraction = fraction.trim_end_matches('0').to_string();
    while fraction.len() < min_decimals as usize {
        fraction.push('0');
    }

    if fraction.is_empty() {
        integer_part.to_string()
    } else {
        format!("{integer_part}.{fraction}")
    }
}

/// `floor(value * 1000) mod 10 == 0`, computed on the fractional part so
/// large amounts cannot overflow.
fn thousandths_digit_is_zero(value: Decimal) -> bool {
    let thousandths = (value.fract() * Decimal::ONE_THOUSAND).floor();
    (thousandths % Decimal::TEN).is_zero()
}
