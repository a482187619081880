//! Shared test data.

use careflow::collaborators::classifier::IntentOutcome;
use careflow::collaborators::repository::{
    AppointmentRow, AppointmentStatus, ClinicInfo, ProviderInfo, UserRow,
};
use careflow::state::{AppointmentCriteria, IdentityFields};
use careflow::types::Intent;

pub fn jane_doe() -> UserRow {
    UserRow {
        id: "u-jane".to_string(),
        full_name: "Jane Doe".to_string(),
        phone_number: "+15551234567".to_string(),
        date_of_birth: "1990-01-01".to_string(),
    }
}

pub fn jane_identity() -> IdentityFields {
    IdentityFields {
        full_name: Some("Jane Doe".to_string()),
        phone_number: Some("+15551234567".to_string()),
        date_of_birth: Some("1990-01-01".to_string()),
    }
}

pub fn smith_appointment() -> AppointmentRow {
    AppointmentRow {
        id: "appt-1".to_string(),
        starts_at: "2025-10-15T14:30:00+00:00".to_string(),
        ends_at: "2025-10-15T15:00:00+00:00".to_string(),
        reason: "Annual checkup".to_string(),
        status: AppointmentStatus::Scheduled,
        provider: ProviderInfo {
            full_name: "Emily Smith".to_string(),
            specialty: "Cardiology".to_string(),
        },
        clinic: ClinicInfo {
            name: "Northside Clinic".to_string(),
            address_line1: "12 Oak St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62704".to_string(),
        },
    }
}

pub fn jones_appointment() -> AppointmentRow {
    AppointmentRow {
        id: "appt-2".to_string(),
        starts_at: "2025-11-03T09:00:00+00:00".to_string(),
        ends_at: "2025-11-03T09:30:00+00:00".to_string(),
        reason: "Skin consultation".to_string(),
        status: AppointmentStatus::Scheduled,
        provider: ProviderInfo {
            full_name: "Alan Jones".to_string(),
            specialty: "Dermatology".to_string(),
        },
        clinic: ClinicInfo {
            name: "Eastside Medical".to_string(),
            address_line1: "400 Pine Ave".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62702".to_string(),
        },
    }
}

pub fn intent(intent: Intent) -> IntentOutcome {
    IntentOutcome {
        intent,
        confidence: 0.95,
        identity: None,
        appointment: None,
    }
}

pub fn cancel_intent_with_identity() -> IntentOutcome {
    IntentOutcome {
        intent: Intent::CancelAppointment,
        confidence: 0.95,
        identity: Some(jane_identity()),
        appointment: None,
    }
}

pub fn cancel_intent_with_identity_and_doctor(doctor: &str) -> IntentOutcome {
    IntentOutcome {
        intent: Intent::CancelAppointment,
        confidence: 0.95,
        identity: Some(jane_identity()),
        appointment: Some(AppointmentCriteria {
            doctor_full_name: Some(doctor.to_string()),
            clinic_name: None,
            appointment_date: None,
            specialty: None,
        }),
    }
}
