//! [`Command`] for authorizing a [`User`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`].
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db, St> Command<AuthorizeUserSession> for Service<Db, St>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let claims = jsonwebtoken::decode::<session::Claims>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &self.config().jwt_validation(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        let user = self
            .database()
            .execute(Select(By::new(claims.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::UserNotExists(claims.user_id))
            .map_err(tracerr::wrap!())?;

        Ok(Session {
            user_id: user.id,
            role: user.role,
            expires_at: claims.expires_at,
        })
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Select},
        DateTime,
    };
    use jsonwebtoken::{DecodingKey, EncodingKey, Header};
    use serde::Serialize;
    use tracerr::Traced;
    use uuid::Uuid;

    use crate::{
        domain::{
            user::{self, session},
            User,
        },
        infra::{database, Database},
        Buckets, Config, Service,
    };

    use super::{AuthorizeUserSession, Command as _, ExecutionError};

    const SECRET: &[u8] = b"secret";

    /// [`Database`] containing a single administrator.
    struct Admin(User);

    impl Database<Select<By<Option<User>, user::Id>>> for Admin {
        type Ok = Option<User>;
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            Select(by): Select<By<Option<User>, user::Id>>,
        ) -> Result<Self::Ok, Self::Err> {
            let id: user::Id = by.into_inner();
            Ok((id == self.0.id).then(|| self.0.clone()))
        }
    }

    #[derive(Serialize)]
    struct Claims {
        sub: Uuid,
        exp: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        aud: Option<&'static str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        role: Option<&'static str>,
    }

    fn service(user: User) -> Service<Admin, ()> {
        service_for(user, None)
    }

    fn service_for(user: User, audience: Option<&str>) -> Service<Admin, ()> {
        let config = Config {
            jwt_decoding_key: DecodingKey::from_secret(SECRET),
            jwt_audience: audience.map(ToOwned::to_owned),
            buckets: Buckets {
                houses: "house_images".parse().unwrap(),
                rooms: "room_images".parse().unwrap(),
            },
        };
        Service::new(config, Admin(user), ())
    }

    fn admin(id: Uuid) -> User {
        User {
            id: id.into(),
            first_name: user::Name::new("Ana").unwrap(),
            last_name: user::Name::new("Silva").unwrap(),
            email: None,
            phone: None,
            nationality: None,
            preferred_language: user::Language::new("pt").unwrap(),
            role: user::Role::Admin,
            room_number: None,
            house_number: None,
            picture_url: None,
            arrival_date: None,
            departure_estimate: None,
        }
    }

    fn token(sub: Uuid, exp: i64) -> session::Token {
        encode(&Claims {
            sub,
            exp,
            aud: None,
            role: None,
        })
    }

    fn encode(claims: &Claims) -> session::Token {
        let token = jsonwebtoken::encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        token.parse().unwrap()
    }

    /// Token as the hosted authentication backend issues it.
    fn backend_token(sub: Uuid, aud: &'static str) -> session::Token {
        encode(&Claims {
            sub,
            exp: in_an_hour(),
            aud: Some(aud),
            role: Some("authenticated"),
        })
    }

    fn in_an_hour() -> i64 {
        DateTime::now().unix_timestamp() + 3600
    }

    #[tokio::test]
    async fn authorizes_existing_user_with_its_role() {
        let id = Uuid::new_v4();
        let svc = service(admin(id));

        let session = svc
            .execute(AuthorizeUserSession {
                token: token(id, in_an_hour()),
            })
            .await
            .unwrap();

        assert_eq!(session.user_id, user::Id::from(id));
        assert!(session.is_admin());
    }

    #[tokio::test]
    async fn rejects_unknown_user() {
        let svc = service(admin(Uuid::new_v4()));

        let err = svc
            .execute(AuthorizeUserSession {
                token: token(Uuid::new_v4(), in_an_hour()),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.into_inner(), ExecutionError::UserNotExists(_)));
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let id = Uuid::new_v4();
        let svc = service(admin(id));

        let err = svc
            .execute(AuthorizeUserSession {
                token: token(id, DateTime::now().unix_timestamp() - 3600),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.into_inner(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }

    #[tokio::test]
    async fn accepts_token_of_configured_audience() {
        let id = Uuid::new_v4();
        let svc = service_for(admin(id), Some("authenticated"));

        let session = svc
            .execute(AuthorizeUserSession {
                token: backend_token(id, "authenticated"),
            })
            .await
            .unwrap();

        assert_eq!(session.user_id, user::Id::from(id));
    }

    #[tokio::test]
    async fn accepts_any_audience_when_unconfigured() {
        let id = Uuid::new_v4();
        let svc = service(admin(id));

        assert!(svc
            .execute(AuthorizeUserSession {
                token: backend_token(id, "authenticated"),
            })
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn rejects_token_of_foreign_audience() {
        let id = Uuid::new_v4();
        let svc = service_for(admin(id), Some("authenticated"));

        let err = svc
            .execute(AuthorizeUserSession {
                token: backend_token(id, "anon"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.into_inner(),
            ExecutionError::JsonWebTokenDecodeError(_),
        ));
    }
}
