//! Input validation and parsing utilities
//!
//! Used by the onboarding wizard for draft field parsing and by the
//! reminder scheduler for wall-clock times.

/// Parse a comma-delimited multi-value field into trimmed, non-empty
/// tokens.
///
/// Order is preserved and duplicates are kept on purpose: the list
/// reflects exactly what the user typed.
pub fn parse_tag_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a wall-clock "HH:MM" string into (hour, minute)
pub fn parse_clock_time(time: &str) -> Option<(u32, u32)> {
    let (h, m) = time.split_once(':')?;
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Validate a user's name (required field)
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if name.len() > 100 {
        return Err("Name too long".to_string());
    }
    Ok(())
}

/// Validate age in years
pub fn validate_age(age: u32) -> Result<(), String> {
    if age < 1 {
        return Err("Age must be at least 1 year".to_string());
    }
    if age > 120 {
        return Err("Age cannot exceed 120 years".to_string());
    }
    Ok(())
}

/// Validate weight value (in kg)
pub fn validate_weight_kg(weight_kg: f64) -> Result<(), String> {
    if weight_kg.is_nan() || weight_kg.is_infinite() {
        return Err("Weight must be a valid number".to_string());
    }
    if weight_kg < 20.0 {
        return Err("Weight must be at least 20 kg".to_string());
    }
    if weight_kg > 500.0 {
        return Err("Weight must be at most 500 kg".to_string());
    }
    Ok(())
}

/// Validate height value (in cm)
pub fn validate_height_cm(height_cm: f64) -> Result<(), String> {
    if height_cm.is_nan() || height_cm.is_infinite() {
        return Err("Height must be a valid number".to_string());
    }
    if height_cm < 50.0 {
        return Err("Height must be at least 50 cm".to_string());
    }
    if height_cm > 300.0 {
        return Err("Height must be at most 300 cm".to_string());
    }
    Ok(())
}
