//! Socket-server double.
//!
//! Routes outbound envelopes the way the live server does: room broadcasts
//! go to every participant (including the sender — the client's echo
//! suppression is part of the contract under test), invitations go to the
//! other participants, and `ping` is answered with `pong`. Server-originated
//! pushes (reminders, invites) are injected with [`SimHub::push`].

use std::collections::{HashMap, HashSet, VecDeque};

use classline_proto::{Envelope, RoomId, UserId};

/// In-memory socket hub connecting any number of simulated clients.
#[derive(Debug, Default)]
pub struct SimHub {
    /// Room membership.
    rooms: HashMap<RoomId, HashSet<UserId>>,
    /// Pending inbound envelopes per user.
    queues: HashMap<UserId, VecDeque<Envelope>>,
}

impl SimHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user's connection (idempotent).
    pub fn register(&mut self, user: &UserId) {
        self.queues.entry(user.clone()).or_default();
    }

    /// Current members of a room.
    pub fn members(&self, room_id: &RoomId) -> impl Iterator<Item = &UserId> {
        self.rooms.get(room_id).into_iter().flatten()
    }

    /// Process an envelope a client sent.
    pub fn handle_outbound(&mut self, from: &UserId, envelope: Envelope) {
        match envelope {
            Envelope::UserConnected(announce) => {
                self.register(&announce.user_id);
            },
            Envelope::JoinRoom(join) => {
                self.register(from);
                self.rooms.entry(join.room_id).or_default().insert(from.clone());
            },
            Envelope::SendMessage(push) => {
                // Broadcast to the whole room, sender included.
                let members: Vec<UserId> =
                    self.members(&push.room_id).cloned().collect();
                for member in members {
                    self.push(&member, Envelope::ReceiveMessage(push.clone()));
                }
            },
            Envelope::SendMeetingInvitation(invitation) => {
                let others: Vec<UserId> = self
                    .members(&invitation.room_id)
                    .filter(|member| *member != from)
                    .cloned()
                    .collect();
                for member in others {
                    self.push(&member, Envelope::ReceiveMeetingInvitation(invitation.clone()));
                }
            },
            Envelope::SendAppointmentInvitation(invitation) => {
                let others: Vec<UserId> = self
                    .members(&invitation.room_id)
                    .filter(|member| *member != from)
                    .cloned()
                    .collect();
                for member in others {
                    self.push(
                        &member,
                        Envelope::ReceiveAppointmentInvitation(invitation.clone()),
                    );
                }
            },
            Envelope::Ping => {
                self.push(from, Envelope::Pong);
            },
            // Inbound-only envelopes never originate from a client.
            Envelope::ReceiveMessage(_)
            | Envelope::ReceiveMeetingInvitation(_)
            | Envelope::ReceiveAppointmentInvitation(_)
            | Envelope::MeetingReminder(_)
            | Envelope::RoleChanged(_)
            | Envelope::Pong => {},
        }
    }

    /// Inject a server-originated envelope into a user's queue.
    pub fn push(&mut self, to: &UserId, envelope: Envelope) {
        self.queues.entry(to.clone()).or_default().push_back(envelope);
    }

    /// Drain a user's pending inbound envelopes.
    pub fn drain(&mut self, user: &UserId) -> Vec<Envelope> {
        self.queues.get_mut(user).map(|queue| queue.drain(..).collect()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use classline_proto::payloads::chat::ChatPush;
    use classline_proto::payloads::session::JoinRoom;

    use super::*;

    fn join(room: &str) -> Envelope {
        Envelope::JoinRoom(JoinRoom { room_id: RoomId::new(room) })
    }

    fn message(room: &str, from: &str, body: &str) -> Envelope {
        Envelope::SendMessage(ChatPush {
            room_id: RoomId::new(room),
            message: body.to_string(),
            is_encrypted: false,
            sender_id: UserId::new(from),
            sender: from.to_string(),
            offer: None,
        })
    }

    #[test]
    fn room_broadcast_reaches_all_members_including_sender() {
        let mut hub = SimHub::new();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        hub.handle_outbound(&alice, join("offer123"));
        hub.handle_outbound(&bob, join("offer123"));
        hub.handle_outbound(&alice, message("offer123", "alice", "hi"));

        assert_eq!(hub.drain(&bob).len(), 1);
        assert_eq!(hub.drain(&alice).len(), 1, "sender receives its own broadcast back");
    }

    #[test]
    fn messages_stay_scoped_to_their_room() {
        let mut hub = SimHub::new();
        let alice = UserId::new("alice");
        let carol = UserId::new("carol");

        hub.handle_outbound(&alice, join("offer123"));
        hub.handle_outbound(&carol, join("offer999"));
        hub.handle_outbound(&alice, message("offer123", "alice", "hi"));

        assert!(hub.drain(&carol).is_empty());
    }

    #[test]
    fn ping_is_answered_with_pong() {
        let mut hub = SimHub::new();
        let alice = UserId::new("alice");
        hub.register(&alice);

        hub.handle_outbound(&alice, Envelope::Ping);
        assert_eq!(hub.drain(&alice), vec![Envelope::Pong]);
    }
}
