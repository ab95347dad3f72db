//! User, role and authentication forms
//!
//! Accounts live in the backend; the front-end only needs the public user
//! fields, the role attached to a token, and the login/signup inputs.

use serde::{Deserialize, Serialize};

use super::choice::choice_enum;
use super::expert::ExpertService;
use super::form::{FieldError, FormFields, Validator};
use super::wire;

choice_enum! {
    /// Account role as reported by the backend
    pub enum Role {
        Apporteur => ("apporteur", "Apporteur d'affaires"),
        Chercheur => ("chercheur", "Chercheur d'affaires"),
        Expert => ("expert", "Expert"),
        Admin => ("admin", "Administrateur"),
        Member => ("user", "Utilisateur"),
    }
    fallback = Member;
}

impl Role {
    /// Roles a visitor may pick when signing up
    pub const SIGNUP: &'static [Role] = &[Role::Apporteur, Role::Chercheur, Role::Expert];

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

/// Public user fields (password is write-only on the backend)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub id: i64,
    pub username: String,
    #[serde(default, deserialize_with = "wire::nullable_string")]
    pub first_name: String,
    #[serde(default, deserialize_with = "wire::nullable_string")]
    pub last_name: String,
    #[serde(default, deserialize_with = "wire::nullable_string")]
    pub email: String,
}

impl UserInfo {
    /// "First Last", or the username when no name is set
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn from_fields(fields: FormFields) -> Self {
        Self {
            username: fields.text("username"),
            password: fields.text("password"),
        }
    }

    pub fn validate(&self) -> Vec<FieldError> {
        Validator::default()
            .required("username", &self.username)
            .required("password", &self.password)
            .finish()
    }
}

/// Account creation input, shared by every role
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub role: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub specialty: String,
    pub location: String,
    pub experience_years: String,
    pub service: String,
}

impl SignupForm {
    pub fn from_fields(fields: FormFields) -> Self {
        Self {
            role: fields.text("role"),
            username: fields.text("username"),
            first_name: fields.text("first_name"),
            last_name: fields.text("last_name"),
            email: fields.text("email"),
            password: fields.text("password"),
            password_confirm: fields.text("password_confirm"),
            specialty: fields.text("specialite"),
            location: fields.text("localisation"),
            experience_years: fields.text("duree_experience"),
            service: fields.text("services_proposes"),
        }
    }

    fn signup_role(&self) -> Option<Role> {
        Role::from_code(&self.role).filter(|role| Role::SIGNUP.contains(role))
    }

    pub fn validate(&self) -> Vec<FieldError> {
        let role = self.signup_role();
        let mut validator = Validator::default();
        validator
            .check("role", role.is_some(), "Choisissez un profil")
            .required("username", &self.username)
            .required("email", &self.email)
            .check(
                "email",
                self.email.is_empty() || self.email.contains('@'),
                "Adresse email invalide",
            )
            .required("password", &self.password)
            .check(
                "password_confirm",
                self.password == self.password_confirm,
                "Les mots de passe ne correspondent pas",
            );

        if role == Some(Role::Expert) {
            validator
                .required("specialite", &self.specialty)
                .required("localisation", &self.location)
                .check(
                    "duree_experience",
                    self.experience_years.parse::<u32>().is_ok(),
                    "Nombre d'années invalide",
                )
                .check(
                    "services_proposes",
                    ExpertService::from_code(&self.service).is_some(),
                    "Service inconnu",
                );
        }
        validator.finish()
    }

    /// Body for the backend signup endpoint. Call after `validate`.
    pub fn payload(&self) -> SignupPayload {
        let role = self.signup_role().unwrap_or_default();
        let expert = role == Role::Expert;
        SignupPayload {
            role: role.code().to_string(),
            user: NewUser {
                username: self.username.clone(),
                first_name: self.first_name.clone(),
                last_name: self.last_name.clone(),
                email: self.email.clone(),
                password: self.password.clone(),
            },
            duree_experience: expert
                .then(|| self.experience_years.parse().ok())
                .flatten(),
            specialite: expert.then(|| self.specialty.clone()),
            localisation: expert.then(|| self.location.clone()),
            services_proposes: expert
                .then(|| ExpertService::from_code_lossy(&self.service).code().to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// JSON body of `POST signup/`
#[derive(Debug, Clone, Serialize)]
pub struct SignupPayload {
    pub role: String,
    pub user: NewUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duree_experience: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialite: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localisation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services_proposes: Option<String>,
}
