use super::{App, AppAction, AppActionContext, AppCommand};
use crate::core::onboarding::OnboardingStep;

pub(super) fn handle_onboarding_action(
    app: &mut App,
    action: AppAction,
    _ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::OnboardingSubmit => submit(app),
        AppAction::OnboardingBack => {
            if let Some(onboarding) = app.onboarding_mut() {
                onboarding.back();
            }
            None
        }
        AppAction::AddInterest { tag } => {
            let added = app
                .onboarding_mut()
                .is_some_and(|onboarding| onboarding.add_interest(tag.as_deref()));
            if !added {
                app.ui.set_status("Interesse vazio ou repetido");
            }
            None
        }
        AppAction::RemoveInterest { tag } => {
            if let Some(onboarding) = app.onboarding_mut() {
                onboarding.remove_interest(&tag);
            }
            None
        }
        AppAction::CompleteOnboarding => app.complete_onboarding(),
        _ => unreachable!("non-onboarding action routed to onboarding handler"),
    }
}

fn submit(app: &mut App) -> Option<AppCommand> {
    let onboarding = app.onboarding_mut()?;
    match onboarding.step() {
        OnboardingStep::NameEntry | OnboardingStep::AgeEntry => {
            let step = onboarding.step();
            if !onboarding.advance() && step == OnboardingStep::AgeEntry {
                app.ui.set_status("Você precisa ter 18 anos ou mais");
            }
            None
        }
        OnboardingStep::InterestEntry if !onboarding.pending_interest().trim().is_empty() => {
            if !onboarding.add_interest(None) {
                app.ui.set_status("Esse interesse já foi adicionado");
            }
            None
        }
        OnboardingStep::InterestEntry => app.complete_onboarding(),
        OnboardingStep::Complete => None,
    }
}
