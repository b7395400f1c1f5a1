// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AccessKeyRepository, UserRepository},
    models::{
        access_key::InvalidKeyReason,
        auth::{Claims, RegisterUserPayload, User},
        profile::Profile,
    },
    services::profile_service::ProfileService,
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    key_repo: AccessKeyRepository,
    profile_service: ProfileService,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        key_repo: AccessKeyRepository,
        profile_service: ProfileService,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            key_repo,
            profile_service,
            jwt_secret,
            pool,
        }
    }

    /// Registro gateado por chave de acesso, em UMA transação:
    /// conta -> perfil -> consumo da chave. Se o consumo for recusado no
    /// commit (chave esgotada numa corrida, por exemplo), a transação
    /// inteira desfaz: nenhuma conta órfã e nenhum uso queimado por um
    /// registro que não aconteceu.
    pub async fn register_user(&self, payload: RegisterUserPayload) -> Result<String, AppError> {
        // 1. Checagem antecipada da chave, só para falhar cedo com um
        // motivo preciso. A palavra final é do UPDATE condicional lá embaixo.
        let key = self
            .key_repo
            .find_by_value(&payload.access_key)
            .await?
            .ok_or(AppError::InvalidAccessKey(InvalidKeyReason::NotFound))?;
        key.eligibility(payload.role)
            .map_err(AppError::InvalidAccessKey)?;

        // 2. Hashing (fora da transação, pois não toca no banco)
        let password = payload.password.clone();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 3. Cria a conta (e-mail único pela constraint)
        let new_user = self
            .user_repo
            .create_user(&mut *tx, &payload.email, &hashed_password)
            .await?;

        // 4. Cria o único perfil da conta, já com o papel que a chave
        // autoriza (unicidade por constraint, não por check-then-insert)
        self.profile_service
            .create_profile(
                &mut *tx,
                new_user.id,
                payload.role,
                payload.branch_id,
                &payload.full_name,
                payload.phone.as_deref(),
            )
            .await?;

        // 5. Consome o uso da chave DENTRO da transação. O UPDATE
        // condicional re-checa ativa/papel/limite no commit; zero linhas
        // afetadas = registro inteiro desfeito.
        let consumed = self
            .key_repo
            .consume(&mut *tx, &payload.access_key, Some(payload.role))
            .await?;

        let Some(new_use_count) = consumed else {
            // A chave era válida no passo 1 mas perdeu a corrida.
            return Err(AppError::InvalidAccessKey(InvalidKeyReason::Exhausted));
        };

        // 6. Deu tudo certo: commita.
        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!(
            account_id = %new_user.id,
            role = payload.role.as_str(),
            key_uses = new_use_count,
            "Nova conta registrada via chave de acesso"
        );

        // 7. Gera o token (não precisa de transação)
        self.create_token(new_user.id)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    /// Resolve conta E perfil frescos do banco a cada requisição. O papel
    /// nunca vem de cache nem de estado global: sempre do perfil atual.
    pub async fn validate_token(&self, token: &str) -> Result<(User, Profile), AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        let user = self
            .user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let profile = self.profile_service.get_profile(user.id).await?;

        Ok((user, profile))
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        // Usa '?' para um tratamento de erro mais limpo
        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
