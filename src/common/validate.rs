// src/common/validate.rs
//
// Validadores customizados compartilhados pelos payloads dos handlers.

use rust_decimal::Decimal;
use validator::ValidationError;

/// Valida um telefone WhatsApp brasileiro: DDD + número, com ou sem +55.
/// Aceita máscaras comuns ("(11) 99999-9999") e exige só dígitos por baixo.
pub fn validate_whatsapp(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    let unmasked: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ' ' | '(' | ')' | '-' | '.'))
        .collect();

    let digits = unmasked.strip_prefix('+').unwrap_or(&unmasked);

    let ok = !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && (10..=13).contains(&digits.len());

    if !ok {
        let mut err = ValidationError::new("whatsapp");
        err.message = Some("Informe um WhatsApp válido, com DDD.".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() || val.is_zero() {
        let mut err = ValidationError::new("range");
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

/// Percentual de comissão: 0 a 100.
pub fn validate_commission_rate(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() || *val > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("range");
        err.message = Some("A comissão deve ficar entre 0 e 100%.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn accepts_masked_and_unmasked_whatsapp() {
        assert!(validate_whatsapp("(11) 99999-9999").is_ok());
        assert!(validate_whatsapp("11999999999").is_ok());
        assert!(validate_whatsapp("+5511999999999").is_ok());
    }

    #[test]
    fn rejects_short_or_non_numeric_whatsapp() {
        assert!(validate_whatsapp("9999").is_err());
        assert!(validate_whatsapp("onze nove nove").is_err());
        assert!(validate_whatsapp("").is_err());
    }

    #[test]
    fn positive_rejects_zero_and_negative() {
        assert!(validate_positive(&dec!(0)).is_err());
        assert!(validate_positive(&dec!(-1.50)).is_err());
        assert!(validate_positive(&dec!(1.99)).is_ok());
        assert!(validate_not_negative(&dec!(0)).is_ok());
    }

    #[test]
    fn commission_rate_stays_within_percent() {
        assert!(validate_commission_rate(&dec!(0)).is_ok());
        assert!(validate_commission_rate(&dec!(30)).is_ok());
        assert!(validate_commission_rate(&dec!(100)).is_ok());
        assert!(validate_commission_rate(&dec!(100.01)).is_err());
        assert!(validate_commission_rate(&dec!(-5)).is_err());
    }
}
