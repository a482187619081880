//! Canonical topology for the appointment-assistant dialogue.

use std::sync::Arc;

use super::builder::{GraphBuilder, GraphError};
use super::edges::RouteTable;
use super::graph::DialogueGraph;
use crate::collaborators::classifier::Classifier;
use crate::collaborators::repository::Repository;
use crate::nodes::{
    ActionResponseNode, ActionRouterNode, AskConfirmationNode, ClarificationNode,
    ConversationManagerNode, ListAppointmentsNode, ProcessConfirmationNode, QaAnswerNode,
    VerificationAppointmentNode, VerificationGateNode, VerificationPatientNode,
};
use crate::runtime::config::RuntimeConfig;
use crate::types::{NodeId, Route};
use crate::verify::matcher::AppointmentMatcher;
use crate::verify::resolver::VerificationResolver;

/// Wire the full appointment-assistant graph.
///
/// Every node that produces a user-facing message is an interrupt-after
/// point: the turn suspends there until the next inbound message arrives.
pub fn appointment_assistant_graph(
    classifier: Arc<dyn Classifier>,
    repository: Arc<dyn Repository>,
    config: &RuntimeConfig,
) -> Result<DialogueGraph, GraphError> {
    let resolver = VerificationResolver::new(repository.clone(), config.repository_timeout);
    let matcher = AppointmentMatcher::new(classifier.clone(), config.classifier_timeout)
        .with_min_required_fields(config.min_match_fields);

    GraphBuilder::new()
        .add_node(
            NodeId::ConversationManager,
            ConversationManagerNode::new(classifier.clone(), config.classifier_timeout),
        )
        .add_node(
            NodeId::QaAnswer,
            QaAnswerNode::new(classifier.clone(), config.classifier_timeout),
        )
        .add_node(NodeId::VerificationGate, VerificationGateNode)
        .add_node(
            NodeId::VerificationPatient,
            VerificationPatientNode::new(resolver),
        )
        .add_node(
            NodeId::VerificationAppointment,
            VerificationAppointmentNode::new(
                repository.clone(),
                matcher,
                config.repository_timeout,
            ),
        )
        .add_node(NodeId::Clarification, ClarificationNode)
        .add_node(NodeId::ActionRouter, ActionRouterNode)
        .add_node(NodeId::ListAppointments, ListAppointmentsNode)
        .add_node(NodeId::AskConfirmation, AskConfirmationNode)
        .add_node(
            NodeId::ProcessConfirmation,
            ProcessConfirmationNode::new(
                classifier,
                repository,
                config.classifier_timeout,
                config.repository_timeout,
                config.max_confirmation_attempts,
            ),
        )
        .add_node(NodeId::ActionResponse, ActionResponseNode)
        .with_entry(NodeId::ConversationManager)
        .add_conditional_edge(
            NodeId::ConversationManager,
            RouteTable::new()
                .route(Route::Qa, NodeId::QaAnswer)
                .route(Route::Appointment, NodeId::VerificationGate),
        )
        .add_edge(NodeId::QaAnswer, NodeId::ConversationManager)
        .add_conditional_edge(
            NodeId::VerificationGate,
            RouteTable::new()
                .route(Route::UserVerification, NodeId::VerificationPatient)
                .route(Route::AppointmentVerification, NodeId::VerificationAppointment)
                .route(Route::Verified, NodeId::ActionRouter),
        )
        .add_conditional_edge(
            NodeId::VerificationPatient,
            RouteTable::new()
                .route(Route::NotVerified, NodeId::Clarification)
                .route(Route::Verified, NodeId::VerificationAppointment),
        )
        .add_conditional_edge(
            NodeId::VerificationAppointment,
            RouteTable::new()
                .route(Route::NotVerified, NodeId::Clarification)
                .route(Route::Verified, NodeId::ActionRouter),
        )
        .add_conditional_edge(
            NodeId::ActionRouter,
            RouteTable::new()
                .route(Route::Wait, NodeId::Clarification)
                .route(Route::List, NodeId::ListAppointments)
                .route(Route::Confirm, NodeId::AskConfirmation)
                .route(Route::Cancel, NodeId::AskConfirmation),
        )
        .add_edge(NodeId::ListAppointments, NodeId::ActionResponse)
        .add_edge(NodeId::AskConfirmation, NodeId::ProcessConfirmation)
        .add_conditional_edge(
            NodeId::ProcessConfirmation,
            RouteTable::new()
                .route(Route::Confirmed, NodeId::ActionResponse)
                .route(Route::Rejected, NodeId::ActionResponse)
                .route(Route::Unclear, NodeId::AskConfirmation),
        )
        .add_edge(NodeId::Clarification, NodeId::ConversationManager)
        .add_edge(NodeId::ActionResponse, NodeId::ConversationManager)
        .interrupt_after([
            NodeId::QaAnswer,
            NodeId::Clarification,
            NodeId::AskConfirmation,
            NodeId::ActionResponse,
        ])
        .compile()
}
