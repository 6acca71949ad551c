//! Ce fichier contient multiple implémentation de normalisation. Il est
//! utilisé par la bibliothèque en interne, bien qu'acessible en soit par
//! un utilisateur externe.
//!
//! Implémentation de final-state-rs, tenter d'implémenter FSE en Rust.
//! Author: Adrien Zinger, avec l'inspiration du travail de Jarek Duda,
//!         Yann Collet, Charles Bloom et bien d'autres.
//!
//! [`normalize_counts`] is the normalizer actually wired into the encoder:
//! a carry-based (error-diffusion) rescaling that never lets a present
//! symbol round down to zero. The other functions below are earlier,
//! independent attempts at the same problem, kept as documented
//! alternates — see `DESIGN.md`.

use crate::error::{FscError, FscResult};
use crate::LOG_TAB_SIZE;

#[derive(Debug)]
pub enum NormError {
    RunLengthEncoding(&'static str),
    MultiplicationOverflow,
    NormalizationError,
}

const SCALE_BITS: u32 = 30;
const DESCALE_ONE: i64 = 1i64 << SCALE_BITS;

/// Rescale `counts[..max_symbol]` so the sum is exactly `2^log_tab_size`,
/// carrying the rounding error from one symbol to the next instead of
/// dumping it onto a single bucket. A symbol with a non-zero input count
/// is never rescaled to zero: it is forced to 1 and the deficit is folded
/// back into the running carry.
///
/// Returns the rescaled histogram, trimmed to one past the last non-zero
/// count, together with that trimmed `max_symbol`.
pub fn normalize_counts(
    counts: &[usize],
    max_symbol: usize,
    log_tab_size: usize,
) -> FscResult<(Vec<usize>, usize)> {
    if log_tab_size < 1 || log_tab_size > LOG_TAB_SIZE {
        return Err(FscError::InvalidParameter("log_tab_size out of range"));
    }
    let t = 1usize << log_tab_size;

    let mut total: u64 = 0;
    let mut nb_symbols = 0usize;
    let mut last_nz = 0usize;
    for (i, &c) in counts.iter().take(max_symbol).enumerate() {
        total += c as u64;
        if c > 0 {
            nb_symbols += 1;
            last_nz = i + 1;
        }
    }
    if nb_symbols == 0 {
        return Err(FscError::InvalidParameter("empty alphabet"));
    }
    if nb_symbols > t {
        return Err(FscError::InvalidParameter(
            "alphabet does not fit in the table",
        ));
    }
    let max_symbol = last_nz;
    let mut norm = vec![0usize; max_symbol];

    // Degenerate case: every table slot holds a distinct symbol.
    if nb_symbols == t {
        for (i, &c) in counts.iter().take(max_symbol).enumerate() {
            if c > 0 {
                norm[i] = 1;
            }
        }
        return Ok((norm, max_symbol));
    }

    let mut working: Vec<u64> = counts[..max_symbol].iter().map(|&c| c as u64).collect();

    // Reserve mass that plain rounding-down would otherwise eat, when the
    // input total is large relative to the target table size.
    if total >= t as u64 {
        let mut total_correction: u64 = 0;
        let mut correction = total;
        loop {
            correction = correction * nb_symbols as u64 / t as u64;
            if correction == 0 {
                break;
            }
            total_correction += correction;
        }
        total_correction >>= log_tab_size;
        if total_correction > 0 {
            for c in working.iter_mut() {
                if *c > 0 {
                    *c += total_correction;
                }
            }
            total = working.iter().sum();
        }
    }

    let shift = SCALE_BITS - log_tab_size as u32;
    let mult = (1u64 << SCALE_BITS) / total;
    let error = (1u64 << SCALE_BITS) % total;
    let mut carry: i64 = if error as i64 >= DESCALE_ONE {
        error as i64
    } else {
        (DESCALE_ONE + error as i64) / 2
    };

    let mut sum: u64 = 0;
    for (i, &c) in working.iter().enumerate() {
        if c == 0 {
            continue;
        }
        let combined = (c * mult) as i64 + carry;
        let mut scaled = combined >> shift;
        carry = combined - (scaled << shift);
        if scaled <= 0 {
            scaled = 1;
            carry -= DESCALE_ONE;
        }
        norm[i] = scaled as usize;
        sum += scaled as u64;
    }

    if sum != t as u64 {
        return Err(FscError::NormalizationError(
            "rescaled histogram does not sum to the table size",
        ));
    }
    Ok((norm, max_symbol))
}

/// Normalisation de la bibliothèque FSE écrite par Yann Collet.
///
/// Notes : Il manque rtbTable et quelques optimisations. Mon objectif
/// principale étant d'écrire ce que je comprend et uniquement ce que je
/// comprend. Une PR avec une amélioration serait la bienvenue avec une
/// excellente description des tenants et des aboutissants ! Sinon je continue
/// à étudier donc les améliorations viendront toute seule.
///
/// Dumps the whole rounding shortfall onto the largest bucket rather than
/// diffusing it; not used by the codec's hot path (see [`normalize_counts`]),
/// kept here as a documented alternate.
pub fn fast_normalization_1(hist: &[usize], table_log: usize) -> Result<Vec<usize>, Box<NormError>> {
    let mut norm = vec![0usize; hist.len()];
    let len = hist.len();

    const HIGH_NUM: usize = (usize::BITS - 2) as usize;

    // L'échelle nous permet de travailler sans utiliser des nombres réels,
    // tout en conservant une certaine précision. Les types tels que float,
    // double, etc. sont souvent difficiles à optimiser pour un programme.
    // On cherche un nombre suffisement grand, mais pas trop pour éviter les
    // difficulté de multiplications.
    let scale: usize = HIGH_NUM - table_log;
    let step: usize = (1usize << HIGH_NUM) / hist.iter().sum::<usize>();
    let mut max = 0;
    let mut max_norm = &mut 0;
    let mut still_to_distribute: isize = 1 << table_log;
    for (s, n) in hist.iter().copied().zip(norm.iter_mut()) {
        if s == len {
            // Lorsque la probabilité de trouver un symbole est égale au nombre
            // total de symboles, la méthode de compression la plus simple
            // consiste à compresser en indiquant une plage de ce symbole.
            //
            // C: [Header, Symbol, Len] = [ "rle", "s", 32 ]
            //
            // Il est probable que pour certaines autres caractéristiques, une
            // compression par plage soit préférable. Cependant, cette question
            // devrait être analysée en dehors de la bibliothèque.
            return Err(Box::new(NormError::RunLengthEncoding(
                "An rle compression should be more accurate",
            )));
        } else if s > 0 {
            // La mise à l'échelle a pour biais le fait qu'une grande
            // statistique d'apparition peut potentiellement dépasser
            // la limite d'un nombre sur 32 ou 64 bits (selon l'architecture).
            // D'où le test de multiplication.
            let proba = s
                .checked_mul(step)
                .ok_or(NormError::MultiplicationOverflow)?
                >> scale;
            *n = proba;
            if proba > max {
                max_norm = n;
                max = proba;
            }
            still_to_distribute -= proba as isize;
        }
    }
    if -still_to_distribute >= (max >> 1) as isize {
        return Err(Box::new(NormError::NormalizationError));
    }
    *max_norm += still_to_distribute as usize;
    Ok(norm)
}

/// Même fonction que `fast_normalisation_1` à l'exception qu'on n'augmente pas
/// artificiellement les variables avec une grande valeur. Le fait de
/// travailler avec des nombres rationnels ralentit énormément le calcul.
/// (utiliser la commande `cargo test` pour voir les différences)
pub fn slow_normalization(hist: &[usize], table_log: usize) -> Result<Vec<usize>, Box<NormError>> {
    let mut norm = vec![0usize; hist.len()];
    let step = (1usize << table_log) as isize / hist.iter().sum::<usize>() as isize;
    let mut max = 0;
    let mut max_norm = &mut 0;
    let mut still_to_distribute: isize = 1 << table_log;
    for (s, n) in hist.iter().copied().zip(norm.iter_mut()) {
        if s > 0 {
            let proba = s as isize * step;
            *n = proba as usize;
            if proba > max {
                max_norm = n;
                max = proba;
            }
            still_to_distribute -= proba as isize;
        }
    }
    if -still_to_distribute >= (max >> 1) as isize {
        return Err(Box::new(NormError::NormalizationError));
    }
    *max_norm += still_to_distribute as usize;
    Ok(norm)
}

pub fn zstd_normalization_1_inplace(
    hist: &mut [usize],
    table_log: usize,
) -> Result<(), Box<NormError>> {
    let len = hist.len();
    const HIGH_NUM: usize = (usize::BITS - 2) as usize;

    let scale: usize = HIGH_NUM - table_log;
    let step: usize = (1usize << HIGH_NUM) / hist.iter().sum::<usize>();
    let mut max = 0;
    let mut max_norm = &mut 0;
    let mut still_to_distribute: isize = 1 << table_log;
    for s in hist.iter_mut() {
        if *s == len {
            return Err(Box::new(NormError::RunLengthEncoding(
                "An rle compression should be more accurate",
            )));
        } else if *s > 0 {
            let proba = ((*s) * step) >> scale;
            *s = proba;
            if proba > max {
                max_norm = s;
                max = proba;
            }
            still_to_distribute -= proba as isize;
        }
    }
    if -still_to_distribute >= (max >> 1) as isize {
        return Err(Box::new(NormError::NormalizationError));
    }
    *max_norm += still_to_distribute as usize;
    Ok(())
}

/// Build cs = f0 + f1 + ... + fs-1
///
/// # hist
///
/// hist[symbol_index] is symbol frequency
/// hist.len() is number of symbols
pub fn build_cumulative_function(hist: &[usize]) -> Vec<usize> {
    let mut cs = Vec::with_capacity(hist.len() + 1);

    let cumul_fn = |acc, frequency| {
        cs.push(acc);
        acc + frequency
    };
    let sum = hist.iter().fold(0, cumul_fn);
    cs.push(sum);
    cs
}

/// Normalisation utilisant une interpolation linéaire de la somme cumulative
/// de l'histogramme. On normalise la fonction cumulative et on en déduis
/// l'histogramme en calculant la dérivée de la fonction.
///
/// On pourrait surement améliorer cette méthode en la rendant plus robuste.
/// Par exemple on pourrait tenter de normaliser avec une table log < total de
/// l'histogramme. Mais cette méthode reste un peu plus lente que l'original,
/// de plus je ne peux pas affirmer qu'elle soit performante pour la
/// compression. À tester.
///
/// # Return
/// The cumulative function in a Ok, or a normalization error in an Err.
/// The input `histogram` is modified in a side effect.
pub fn derivative_normalization(
    histogram: &mut [usize],
    table_log: usize,
) -> Result<Vec<usize>, NormError> {
    // linear interpolation naïve sur une fonction de cumulation
    let mut previous = 0;
    let mut cumul = build_cumulative_function(histogram);
    let max_cumul = *cumul.last().unwrap();
    let target_range = 1 << table_log; // D - C
    let actual_range = max_cumul; // B - A

    for (i, c) in cumul.iter_mut().enumerate().skip(1) {
        *c = (target_range * (*c)) / actual_range;
        if *c <= previous {
            return Err(NormError::NormalizationError);
            // note: we could force to previous + 1 and accumulate a dept that
            //       we substract to the nexts values. If at the end we keep
            //       a dept > 0 we should error. If not just inform user that
            //       we got to force the normalized counter to fit.
        }

        histogram[i - 1] = *c - previous;
        previous = *c;
    }
    Ok(cumul)
}

/// Pareil en somme à la normalisation dérivative. Excepté qu'on augmente le
/// numérateur avec un nombre important (2^62 ou 2^30 selon l'architecture).
/// Cette méthode peut ne pas être adapté avec des fréquence d'aparitions trop
/// grandes.
pub fn derivative_normalization_fast(
    histogram: &mut [usize],
    table_log: usize,
) -> Result<Vec<usize>, NormError> {
    let mut previous = 0;
    let mut cumul = build_cumulative_function(histogram);
    let max_cumul = *cumul.last().unwrap();
    const HIGH_NUM: usize = usize::BITS as usize - 2;
    let scale: usize = HIGH_NUM - table_log;
    let step = (1 << HIGH_NUM) / max_cumul;
    let mut still_to_distribute = 1 << table_log;
    for (i, c) in cumul.iter_mut().enumerate().skip(1) {
        *c = (*c)
            .checked_mul(step)
            .ok_or(NormError::MultiplicationOverflow)?
            >> scale;
        if *c <= previous {
            return Err(NormError::NormalizationError);
        }
        histogram[i - 1] = *c - previous;
        still_to_distribute -= histogram[i - 1];
        previous = *c;
    }
    if still_to_distribute > 0 {
        *cumul.last_mut().unwrap() += still_to_distribute;
        *histogram.last_mut().unwrap() += still_to_distribute;
    }
    Ok(cumul)
}
