//! Sample artifacts in canonical form.
//!
//! Each text is exactly what the exporters render for the same data, so a
//! filesystem-to-datastore pass followed by an export leaves them unchanged.

/// `steps/actions/navigation.ts`: an ACTION group with two templates.
pub const NAVIGATION_STEPS: &str = r#"/**
 * @name Navigation
 * @description Moving between pages
 * @type ACTION
 */
import { expect } from '@playwright/test';
import { When, Then } from './fixtures';

/**
 * @name Open page
 * @description Opens a page by route
 * @icon NAVIGATION
 */
When('I open {string}', async ({ page }, route: string) => {
  await page.goto(route);
});

/**
 * @name Click button
 * @description Clicks a button by its label
 * @icon MOUSE
 */
When('I click on the {string} button', async ({ page }, label: string) => {
  await page.getByRole('button', { name: label }).click();
});
"#;

/// `steps/validations/assertions.ts`: a VALIDATION group with one template.
pub const ASSERTION_STEPS: &str = r#"/**
 * @name Assertions
 * @description Checks on page state
 * @type VALIDATION
 */
import { expect } from '@playwright/test';
import { When, Then } from './fixtures';

/**
 * @name See text
 * @description Checks that text is visible
 * @icon EYE
 */
Then('I should see {string}', async ({ page }, text: string) => {
  await expect(page.getByText(text)).toBeVisible();
});
"#;

/// `locators/users/login.json`: group `login` in module `/users`.
pub const LOGIN_LOCATORS: &str = r##"{
  "passwordInput": "#password",
  "submitButton": "button[type=submit]",
  "usernameInput": "#username"
}
"##;

/// `features/users/login.feature`: suite `Login` in module `/users`.
pub const LOGIN_FEATURE: &str = r#"@smoke
Feature: Login
  Users sign in to the application

  @tc_login0001 @critical
  Scenario: [Valid login] User signs in with valid credentials
    Given I open "/login"
    When I click on the "Submit" button
    Then I should see "Welcome"

  @tc_login0002
  Scenario: Logout
    Given I open "/logout"
    Then I should see "Goodbye"
"#;

/// A feature whose scenarios carry no identifier tags yet.
pub const UNTAGGED_FEATURE: &str = r#"Feature: Checkout
  @wip
  Scenario: Pay by card
    Given I open "/checkout"
    When I click on the "Pay" button

  Scenario: Empty cart
    Given I open "/cart"
    Then I should see "Your cart is empty"
"#;
