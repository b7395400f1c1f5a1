// src/models/booking.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// --- Enums ---

// O ciclo de vida do agendamento. 'pending' é o estado inicial;
// 'completed' e 'cancelled' são terminais.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// As únicas arestas legais do ciclo de vida:
    /// pending -> confirmed -> in_progress -> completed,
    /// com pending|confirmed -> cancelled como saídas alternativas.
    pub fn can_transition_to(self, target: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, target),
            (Pending, Confirmed)
                | (Confirmed, InProgress)
                | (InProgress, Completed)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Estados a partir dos quais o cliente ainda pode cancelar.
    pub fn is_cancellable(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub branch_id: Uuid,
    pub service_id: Uuid,
    pub capster_id: Uuid,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
    // A senha da fila, única dentro de (filial, dia)
    pub queue_number: Option<i32>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O agendamento "achatado" para exibição, com os nomes já resolvidos.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub booking: Booking,
    pub branch_name: String,
    pub service_name: String,
    pub capster_name: String,
}

// --- Payloads ---

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingPayload {
    pub branch_id: Uuid,
    pub service_id: Uuid,
    pub capster_id: Uuid,
    pub booking_date: NaiveDate,
    pub booking_time: NaiveTime,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionBookingPayload {
    pub target_status: BookingStatus,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListBookingsQuery {
    pub branch_id: Uuid,
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::BookingStatus::{self, *};

    const ALL: [BookingStatus; 5] = [Pending, Confirmed, InProgress, Completed, Cancelled];

    #[test]
    fn only_the_five_legal_edges_are_allowed() {
        let legal = [
            (Pending, Confirmed),
            (Confirmed, InProgress),
            (InProgress, Completed),
            (Pending, Cancelled),
            (Confirmed, Cancelled),
        ];

        // Tabela exaustiva: toda combinação (estado, alvo) fora da lista
        // acima é recusada, inclusive a identidade e qualquer regressão.
        for from in ALL {
            for to in ALL {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for from in [Completed, Cancelled] {
            assert!(from.is_terminal());
            for to in ALL {
                assert!(!from.can_transition_to(to), "{:?} -> {:?}", from, to);
            }
        }
    }

    #[test]
    fn cancellable_only_before_service_starts() {
        assert!(Pending.is_cancellable());
        assert!(Confirmed.is_cancellable());
        assert!(!InProgress.is_cancellable());
        assert!(!Completed.is_cancellable());
        assert!(!Cancelled.is_cancellable());
    }
}
