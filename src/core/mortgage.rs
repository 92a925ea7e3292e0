const PAYOFF_TOLERANCE: f64 = 1e-6;

/// Level annual payment that amortizes `principal` over `term_years`.
pub fn level_payment(principal: f64, annual_rate: f64, term_years: u32) -> f64 {
    if principal <= 0.0 {
        return 0.0;
    }
    if term_years == 0 {
        return principal;
    }
    if annual_rate == 0.0 {
        return principal / term_years as f64;
    }

    // expm1/ln1p keep `(1 + r)^n - 1` nonzero for rates too small to survive `1.0 + r`.
    let log_growth = term_years as f64 * annual_rate.ln_1p();
    principal * annual_rate * log_growth.exp() / log_growth.exp_m1()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentSplit {
    pub interest: f64,
    pub principal_paid: f64,
    pub effective_payment: f64,
    pub new_balance: f64,
}

pub fn apply_payment(balance: f64, annual_rate: f64, payment: f64) -> PaymentSplit {
    if balance <= 0.0 {
        return PaymentSplit {
            interest: 0.0,
            principal_paid: 0.0,
            effective_payment: 0.0,
            new_balance: 0.0,
        };
    }

    let interest = balance * annual_rate;
    let scheduled_principal = payment - interest;
    if scheduled_principal >= balance - PAYOFF_TOLERANCE {
        return PaymentSplit {
            interest,
            principal_paid: balance,
            effective_payment: interest + balance,
            new_balance: 0.0,
        };
    }

    PaymentSplit {
        interest,
        principal_paid: scheduled_principal,
        effective_payment: payment,
        new_balance: balance - scheduled_principal,
    }
}
