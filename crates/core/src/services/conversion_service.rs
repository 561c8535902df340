use tracing::debug;

use crate::errors::CoreError;
use crate::models::currency::CurrencyCode;
use crate::models::pricing::{EditedField, PricingInputs, PricingSession, DOMESTIC_VAT_RATE};
use crate::models::settings::AppSettings;

// ── Formulas ────────────────────────────────────────────────────────

/// Domestic gross (PLN) for a net amount. Independent of the client VAT rate.
pub fn gross_from_net(net: f64) -> f64 {
    net * (1.0 + DOMESTIC_VAT_RATE)
}

pub fn net_from_gross(gross: f64) -> f64 {
    gross / (1.0 + DOMESTIC_VAT_RATE)
}

/// net → client gross → foreign currency → plus commission.
pub fn listing_from_net(net: f64, exchange_rate: f64, commission_rate: f64, client_vat_rate: f64) -> f64 {
    let client_gross = net * (1.0 + client_vat_rate);
    client_gross * exchange_rate * (1.0 + commission_rate)
}

/// Inverse of [`listing_from_net`].
pub fn net_from_listing(
    listing_price: f64,
    exchange_rate: f64,
    commission_rate: f64,
    client_vat_rate: f64,
) -> f64 {
    let price_in_currency = listing_price / (1.0 + commission_rate);
    let client_gross = price_in_currency / exchange_rate;
    client_gross / (1.0 + client_vat_rate)
}

/// Listing price produced by one PLN of domestic gross.
/// `(1+V) * R * (1+C) / (1+D)`; does not depend on any amount.
pub fn multiplier(exchange_rate: f64, commission_rate: f64, client_vat_rate: f64) -> f64 {
    (1.0 + client_vat_rate) * exchange_rate * (1.0 + commission_rate) / (1.0 + DOMESTIC_VAT_RATE)
}

/// Re-price a listing for a new exchange rate.
pub fn convert_listing_price(old_price: f64, old_rate: f64, new_rate: f64) -> f64 {
    old_price / old_rate * new_rate
}

// ── Validation ──────────────────────────────────────────────────────

pub fn validate_exchange_rate(rate: f64) -> Result<(), CoreError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(CoreError::ValidationError(
            "Exchange rate must be positive".into(),
        ));
    }
    Ok(())
}

pub fn validate_commission_rate(commission: f64) -> Result<(), CoreError> {
    if !commission.is_finite() || commission < 0.0 {
        return Err(CoreError::ValidationError(
            "Commission cannot be negative".into(),
        ));
    }
    Ok(())
}

pub fn validate_client_vat_rate(vat: f64) -> Result<(), CoreError> {
    if !vat.is_finite() || !(0.0..=1.0).contains(&vat) {
        return Err(CoreError::ValidationError(
            "VAT rate must be between 0% and 100%".into(),
        ));
    }
    Ok(())
}

/// Authoritative amount of a recompute: blank is "insufficient", negative is invalid.
fn require_amount(value: Option<f64>, field: EditedField) -> Result<f64, CoreError> {
    match value {
        None => Err(CoreError::InsufficientInput(format!(
            "{field} is empty; enter an amount to recalculate"
        ))),
        Some(v) if v.is_nan() => Err(CoreError::InsufficientInput(format!(
            "{field} is empty; enter an amount to recalculate"
        ))),
        Some(v) if v < 0.0 => Err(CoreError::ValidationError(format!(
            "{field} cannot be negative"
        ))),
        Some(v) if v.is_infinite() => Err(CoreError::ValidationError(format!(
            "{field} must be a finite number"
        ))),
        Some(v) => Ok(v),
    }
}

/// Edited client VAT: NaN and negatives are rejected, anything above 100% is capped.
fn clamp_client_vat(vat: f64) -> Result<f64, CoreError> {
    if vat.is_nan() {
        return Err(CoreError::ValidationError(
            "VAT rate must be a number".into(),
        ));
    }
    if vat < 0.0 {
        return Err(CoreError::ValidationError(
            "VAT rate cannot be negative".into(),
        ));
    }
    Ok(vat.min(1.0))
}

// ── Engine ──────────────────────────────────────────────────────────

/// Net/gross/listing price synchronization.
///
/// Pure business logic: every operation takes the current state by reference
/// and returns a new one, so a rejected edit never leaves half-updated fields.
pub struct ConversionService;

impl ConversionService {
    pub fn new() -> Self {
        Self
    }

    /// Re-derive the two non-authoritative amounts from `edited`.
    ///
    /// - `Net` / `Gross` / `ListingPrice`: that field is the source of truth.
    /// - `ClientVat`: the rate is clamped to at most 1 and prices are re-derived
    ///   from net, or from gross when net is blank. With neither known the
    ///   result is `InsufficientInput`.
    pub fn recompute(
        &self,
        inputs: &PricingInputs,
        edited: EditedField,
    ) -> Result<PricingInputs, CoreError> {
        let mut next = inputs.clone();

        if edited == EditedField::ClientVat {
            next.client_vat_rate = clamp_client_vat(inputs.client_vat_rate)?;
        }

        let rate = next.exchange_rate;
        let commission = next.commission_rate;
        let vat = next.client_vat_rate;

        // Negative amounts are reported before rate problems.
        let authoritative = match edited {
            EditedField::Net => Some(require_amount(inputs.net_amount, edited)?),
            EditedField::Gross => Some(require_amount(inputs.gross_amount, edited)?),
            EditedField::ListingPrice => Some(require_amount(inputs.listing_price, edited)?),
            EditedField::ClientVat => None,
        };

        validate_exchange_rate(rate)?;
        validate_commission_rate(commission)?;
        validate_client_vat_rate(vat)?;

        match (edited, authoritative) {
            (EditedField::Net, Some(net)) => {
                next.gross_amount = Some(gross_from_net(net));
                next.listing_price = Some(listing_from_net(net, rate, commission, vat));
            }
            (EditedField::Gross, Some(gross)) => {
                let net = net_from_gross(gross);
                next.net_amount = Some(net);
                next.listing_price = Some(listing_from_net(net, rate, commission, vat));
            }
            (EditedField::ListingPrice, Some(listing)) => {
                let net = net_from_listing(listing, rate, commission, vat);
                next.net_amount = Some(net);
                next.gross_amount = Some(gross_from_net(net));
            }
            _ => {
                let net = match (inputs.known_net(), inputs.known_gross()) {
                    (Some(net), _) => net,
                    (None, Some(gross)) => net_from_gross(gross),
                    (None, None) => {
                        return Err(CoreError::InsufficientInput(
                            "Enter a net or gross amount to recalculate with the new VAT rate".into(),
                        ))
                    }
                };
                if net < 0.0 {
                    return Err(CoreError::ValidationError(
                        "Net cannot be negative".into(),
                    ));
                }
                next.net_amount = Some(net);
                next.gross_amount = Some(gross_from_net(net));
                next.listing_price = Some(listing_from_net(net, rate, commission, vat));
            }
        }

        next.last_edited_field = Some(edited);
        debug!(
            field = %edited,
            net = ?next.net_amount,
            listing = ?next.listing_price,
            currency = %next.currency,
            "recomputed prices"
        );
        Ok(next)
    }

    /// The user typed `value` into `field`. Returns the recomputed session and
    /// makes its listing price the new baseline for currency switches.
    pub fn apply_edit(
        &self,
        session: &PricingSession,
        field: EditedField,
        value: f64,
    ) -> Result<PricingSession, CoreError> {
        let mut inputs = session.inputs.clone();
        match field {
            EditedField::Net => inputs.net_amount = Some(value),
            EditedField::Gross => inputs.gross_amount = Some(value),
            EditedField::ListingPrice => inputs.listing_price = Some(value),
            EditedField::ClientVat => inputs.client_vat_rate = value,
        }

        let mut next = session.clone();
        next.inputs = self.recompute(&inputs, field)?;
        next.remember_listing();
        Ok(next)
    }

    /// Manual exchange-rate override. Prices follow from the last edited field.
    pub fn set_exchange_rate(
        &self,
        session: &PricingSession,
        rate: f64,
    ) -> Result<PricingSession, CoreError> {
        validate_exchange_rate(rate)?;
        let mut inputs = session.inputs.clone();
        inputs.exchange_rate = rate;
        self.rederive(session, inputs)
    }

    pub fn set_commission_rate(
        &self,
        session: &PricingSession,
        commission: f64,
    ) -> Result<PricingSession, CoreError> {
        validate_commission_rate(commission)?;
        let mut inputs = session.inputs.clone();
        inputs.commission_rate = commission;
        self.rederive(session, inputs)
    }

    /// Blank session with the user's default currency, commission and VAT.
    /// `rate` is the exchange rate to start with for that currency.
    pub fn reset(&self, settings: &AppSettings, rate: f64) -> PricingSession {
        let rate = if validate_exchange_rate(rate).is_ok() {
            rate
        } else {
            settings.default_currency.default_rate()
        };
        PricingSession::new(PricingInputs::new(
            settings.default_currency,
            rate,
            settings.default_commission_rate,
            settings.default_client_vat_rate,
        ))
    }

    /// Change the listing currency once its rate is known.
    ///
    /// When the listing price is what the user typed last, it is converted
    /// from the remembered baseline (switching back to the baseline currency
    /// restores the exact original). Otherwise prices are recomputed fresh
    /// from net/gross with the new rate.
    pub fn switch_currency(
        &self,
        session: &PricingSession,
        currency: CurrencyCode,
        rate: f64,
    ) -> Result<PricingSession, CoreError> {
        validate_exchange_rate(rate)?;

        let current = &session.inputs;
        let mut next = session.clone();
        next.inputs.currency = currency;
        next.inputs.exchange_rate = rate;

        match current.last_edited_field {
            Some(EditedField::ListingPrice) => {
                let Some(listing) = current.known_listing_price() else {
                    return Ok(next);
                };
                if currency != current.currency {
                    let price = match session.original_listing {
                        Some(original) if original.currency == currency => original.price,
                        Some(original) => {
                            convert_listing_price(original.price, original.rate, rate)
                        }
                        None => convert_listing_price(listing, current.exchange_rate, rate),
                    };
                    debug!(from = %current.currency, to = %currency, price, "converted listing price");
                    next.inputs.listing_price = Some(price);
                }
                next.inputs = self.recompute(&next.inputs, EditedField::ListingPrice)?;
            }
            Some(field) if current.has_amount() => {
                next.inputs = self.recompute(&next.inputs, field)?;
                next.remember_listing();
            }
            _ => {}
        }

        Ok(next)
    }

    /// Currency/VAT preset: both change at once, then prices follow from the
    /// new VAT as if the user had typed it.
    ///
    /// Unlike [`ConversionService::switch_currency`] a listing price is never
    /// converted; net (or gross) stays fixed and the listing is re-derived.
    /// With no amount entered yet only the parameters change.
    pub fn apply_preset(
        &self,
        session: &PricingSession,
        currency: CurrencyCode,
        client_vat_rate: f64,
        rate: f64,
    ) -> Result<PricingSession, CoreError> {
        validate_exchange_rate(rate)?;
        let vat = clamp_client_vat(client_vat_rate)?;

        let mut inputs = session.inputs.clone();
        inputs.currency = currency;
        inputs.exchange_rate = rate;
        inputs.client_vat_rate = vat;

        let mut next = session.clone();
        if inputs.known_net().is_some() || inputs.known_gross().is_some() {
            next.inputs = self.recompute(&inputs, EditedField::ClientVat)?;
            next.remember_listing();
        } else {
            validate_commission_rate(inputs.commission_rate)?;
            inputs.last_edited_field = Some(EditedField::ClientVat);
            next.inputs = inputs;
        }
        debug!(%currency, vat, rate, "applied preset");
        Ok(next)
    }

    /// Recompute from the last edited field after a rate/commission change.
    /// With nothing to derive from, only the new parameters are stored.
    fn rederive(
        &self,
        session: &PricingSession,
        inputs: PricingInputs,
    ) -> Result<PricingSession, CoreError> {
        let mut next = session.clone();
        match inputs.last_edited_field {
            Some(field) if inputs.has_amount() => {
                next.inputs = self.recompute(&inputs, field)?;
                next.remember_listing();
            }
            _ => next.inputs = inputs,
        }
        Ok(next)
    }
}

impl Default for ConversionService {
    fn default() -> Self {
        Self::new()
    }
}
