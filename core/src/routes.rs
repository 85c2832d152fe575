//! Endpoint paths, relative to the API prefix.

pub mod auth {
    pub const REGISTER: &str = "auth/register";
    pub const LOGIN: &str = "auth/login";
    pub const REFRESH: &str = "auth/refresh";
    pub const LOGOUT: &str = "auth/logout";
    pub const FORGOT_PASSWORD: &str = "auth/forgot-password";
    pub const RESET_PASSWORD: &str = "auth/reset-password";
}

pub mod users {
    pub const ME: &str = "users/me";
    pub const CHANGE_PASSWORD: &str = "users/me/change-password";
}

pub mod vendors {
    pub const BASE: &str = "vendors";
    pub const SEARCH: &str = "vendors/search";

    pub fn by_id(id: &str) -> String {
        format!("vendors/{id}")
    }

    pub fn by_slug(slug: &str) -> String {
        format!("vendors/slug/{slug}")
    }

    pub fn availability(id: &str) -> String {
        format!("vendors/{id}/availability")
    }

    pub fn reviews(id: &str) -> String {
        format!("vendors/{id}/reviews")
    }
}

pub mod bookings {
    pub const LIST: &str = "bookings";
    pub const ME: &str = "bookings/me";
    pub const STATISTICS: &str = "bookings/me/statistics";

    pub fn detail(id: &str) -> String {
        format!("bookings/{id}")
    }

    pub fn confirm(id: &str) -> String {
        format!("bookings/{id}/confirm")
    }

    pub fn complete(id: &str) -> String {
        format!("bookings/{id}/complete")
    }

    pub fn cancel(id: &str) -> String {
        format!("bookings/{id}/cancel")
    }
}

pub mod guests {
    pub const BASE: &str = "guests";
    pub const RSVP: &str = "guests/rsvp";
    pub const IMPORT_RSVP: &str = "guests/rsvp/import";
    pub const INVITATIONS: &str = "guests/invitations";
    pub const CHECKIN: &str = "guests/checkin";

    pub fn detail(id: &str) -> String {
        format!("guests/{id}")
    }

    pub fn for_booking(booking_id: &str) -> String {
        format!("guests/bookings/{booking_id}/guests")
    }

    pub fn rsvp_summary(booking_id: &str) -> String {
        format!("guests/bookings/{booking_id}/rsvp/summary")
    }
}

pub mod payments {
    pub const INTENTS: &str = "v1/payments/payment/intents";

    pub fn intent(id: &str) -> String {
        format!("v1/payments/payment/intents/{id}")
    }

    pub fn confirm_intent(id: &str) -> String {
        format!("v1/payments/payment/intents/{id}/confirm")
    }

    pub fn fail_intent(id: &str) -> String {
        format!("v1/payments/payment/intents/{id}/fail")
    }
}

pub mod media {
    pub const UPLOAD: &str = "media/upload";

    pub fn detail(id: &str) -> String {
        format!("media/{id}")
    }
}
